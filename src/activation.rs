use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Функция активации: применяется на месте к срезу буфера выходов слоя
pub trait ActivationFunction: Debug + Send + Sync {
    fn activate(&self, values: &mut [f32]);
}

/// Встроенные функции активации
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
    Relu,
}

impl Activation {
    /// Значение функции для одного аргумента
    pub fn eval(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
        }
    }
}

impl ActivationFunction for Activation {
    fn activate(&self, values: &mut [f32]) {
        if *self == Activation::Linear {
            return;
        }
        values.iter_mut().for_each(|v| *v = self.eval(*v));
    }
}
