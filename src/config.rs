use crate::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::path::Path;

/// Описание слоя в файле конфигурации
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    pub neurons: usize,
    pub activation: Activation,
    /// 0.0 - смещения нет
    #[serde(default)]
    pub bias: f32,
    #[serde(default)]
    pub context_fed_by: Option<usize>,
}

/// Топология сети в формате TOML:
/// ```toml
/// seed = 7
/// weight_range = [-1.0, 1.0]
///
/// [[layers]]
/// neurons = 2
/// activation = "linear"
/// bias = 1.0
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologyConfig {
    /// Зерно ChaCha8 для начальных весов; нет - случайное
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_weight_range")]
    pub weight_range: (f32, f32),
    pub layers: Vec<LayerConfig>,
}

fn default_weight_range() -> (f32, f32) {
    (-1.0, 1.0)
}

impl TopologyConfig {
    pub fn from_toml_str(text: &str) -> NetResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> NetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Топология слоев для компиляции
    pub fn layers(&self) -> Vec<LayerTopology> {
        self.layers
            .iter()
            .map(|layer| LayerTopology {
                neurons: layer.neurons,
                bias: layer.bias,
                activation: Arc::new(layer.activation),
                context_fed_by: layer.context_fed_by,
            })
            .collect()
    }

    /// Компиляция сети и заполнение весов случайными значениями
    pub fn build(&self) -> NetResult<FlatNetwork> {
        let mut network = FlatNetwork::new(&self.layers())?;
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (low, high) = self.weight_range;
        network.randomize_uniform(&mut rng, low, high)?;
        debug!(seed = ?self.seed, low, high, "flat network built from config");
        Ok(network)
    }
}
