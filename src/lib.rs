//! Плоская (flat) нейронная сеть: описание слоев компилируется в плотные буферы
//! весов и выходов, расчет в прямом направлении идет по индексам без аллокаций.

mod activation;
mod compute;
mod config;
mod dataset;
mod error;
mod error_calc;
mod flat_net;
mod layer_topology;
mod patterns;

pub use self::{
    activation::*,
    config::*,
    dataset::*,
    error::*,
    error_calc::*,
    flat_net::*,
    layer_topology::*,
    patterns::*,
};

use itertools::Itertools;
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Значение нейрона смещения по умолчанию
pub const DEFAULT_BIAS_ACTIVATION: f32 = 1.0;
/// Смещение отсутствует
pub const NO_BIAS_ACTIVATION: f32 = 0.0;
