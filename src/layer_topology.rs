use crate::*;

/// Топология слоя (описание для компиляции сети, после компиляции не нужно)
#[derive(Clone, Debug)]
pub struct LayerTopology {
    /// Количество нейронов в слое (без смещения и контекста)
    pub neurons: usize,
    /// Значение нейрона смещения, 0.0 - смещения нет
    pub bias: f32,
    /// Функция активации слоя
    pub activation: Arc<dyn ActivationFunction>,
    /// Номер слоя (в том же списке), выходы которого копируются
    /// в контекст этого слоя. Может ссылаться на сам слой.
    pub context_fed_by: Option<usize>,
}

impl LayerTopology {
    pub fn new<A: ActivationFunction + 'static>(neurons: usize, activation: A) -> Self {
        Self::with_shared(neurons, Arc::new(activation))
    }

    /// Слой с уже разделяемой функцией активации
    pub fn with_shared(neurons: usize, activation: Arc<dyn ActivationFunction>) -> Self {
        Self {
            neurons,
            bias: NO_BIAS_ACTIVATION,
            activation,
            context_fed_by: None,
        }
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_context_from(mut self, layer: usize) -> Self {
        self.context_fed_by = Some(layer);
        self
    }

    pub fn has_bias(&self) -> bool {
        self.bias != NO_BIAS_ACTIVATION
    }

    /// Нейроны + смещение (контекст зависит от соседнего слоя)
    pub fn slots_without_context(&self) -> usize {
        self.neurons + usize::from(self.has_bias())
    }
}
