use crate::*;
use std::ops::Range;

/// Связь контекста: выходы нейронов слоя `source` после расчета
/// копируются в блок контекста слоя `target`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextLink {
    pub source: usize,
    pub target: usize,
    /// Начало блока контекста в буфере выходов
    pub offset: usize,
    /// Размер блока = количество нейронов слоя-источника
    pub len: usize,
}

// Пример: вход 2 нейрона + смещение, выход 1 нейрон без смещения
// layer_output: [x1, x2, 1.0, y]
// layer_index:  [0, 3]
// weights:      [w(x1->y), w(x2->y), w(bias->y)]
// weight_index: [0]
/// Скомпилированная сеть: все слои лежат в плоских буферах,
/// слои от входного к выходному
#[derive(Clone, Debug)]
pub struct FlatNetwork {
    /// -Количество ячеек каждого слоя (нейроны + смещение + контекст)
    pub(crate) layer_counts: Vec<usize>,
    /// -Количество нейронов каждого слоя
    pub(crate) layer_feed_counts: Vec<usize>,
    /// -Размер контекста каждого слоя
    pub(crate) layer_context_counts: Vec<usize>,
    /// -Начало каждого слоя в `layer_output`
    pub(crate) layer_index: Vec<usize>,
    /// -Значение смещения каждого слоя (0.0 - смещения нет)
    pub(crate) bias_activation: Vec<f32>,
    /// -Функции активации каждого слоя
    pub(crate) activation_functions: Vec<Arc<dyn ActivationFunction>>,
    /// -Связи контекста
    pub(crate) context_links: Vec<ContextLink>,
    /// -Начало блока весов, питающего слой l+1 от слоя l
    pub(crate) weight_index: Vec<usize>,
    /// -Все веса сети одним вектором
    pub(crate) weights: Vec<f32>,
    /// -Текущие значения всех ячеек всех слоев
    pub(crate) layer_output: Vec<f32>,
}

impl FlatNetwork {
    /// Компиляция сети из топологии слоев (первый - входной, последний - выходной).
    /// Веса нулевые, смещения выставлены, контекст обнулен.
    pub fn new(layers: &[LayerTopology]) -> NetResult<Self> {
        if layers.len() < 2 {
            return Err(reject(format!(
                "at least 2 layers required, found {}",
                layers.len()
            )));
        }
        //размер контекста: по количеству нейронов слоя-источника
        let mut layer_context_counts = vec![0usize; layers.len()];
        for (l, layer) in layers.iter().enumerate() {
            if let Some(source) = layer.context_fed_by {
                let source_layer = layers.get(source).ok_or_else(|| {
                    reject(format!(
                        "layer {l} context is fed by layer {source}, but there are only {} layers",
                        layers.len()
                    ))
                })?;
                layer_context_counts[l] = source_layer.neurons;
            }
        }
        let layer_feed_counts: Vec<usize> = layers.iter().map(|layer| layer.neurons).collect();
        let layer_counts: Vec<usize> = layers
            .iter()
            .zip(&layer_context_counts)
            .map(|(layer, context)| layer.slots_without_context() + context)
            .collect();
        if let Some(l) = layer_counts.iter().position(|count| *count == 0) {
            return Err(reject(format!("layer {l} has no slots")));
        }
        //начало каждого слоя в буфере выходов
        let layer_index: Vec<usize> = layer_counts
            .iter()
            .scan(0, |start, count| {
                let index = *start;
                *start += count;
                Some(index)
            })
            .collect();
        let neuron_count: usize = layer_counts.iter().sum();
        //блоки весов: (все ячейки слоя l) x (нейроны слоя l+1)
        let mut weight_index = Vec::with_capacity(layers.len() - 1);
        let mut weight_count = 0;
        for ((source_slots, _), (_, target_feed)) in layer_counts
            .iter()
            .zip(&layer_feed_counts)
            .tuple_windows()
        {
            weight_index.push(weight_count);
            weight_count += source_slots * target_feed;
        }
        let context_links: Vec<ContextLink> = layers
            .iter()
            .enumerate()
            .filter_map(|(target, layer)| {
                layer.context_fed_by.map(|source| ContextLink {
                    source,
                    target,
                    offset: layer_index[target] + layer.slots_without_context(),
                    len: layer_feed_counts[source],
                })
            })
            .collect();

        let mut network = Self {
            layer_counts,
            layer_feed_counts,
            layer_context_counts,
            layer_index,
            bias_activation: layers.iter().map(|layer| layer.bias).collect(),
            activation_functions: layers.iter().map(|layer| layer.activation.clone()).collect(),
            context_links,
            weight_index,
            weights: vec![0.0; weight_count],
            layer_output: vec![0.0; neuron_count],
        };
        network.clear_context();
        debug!(
            layers = network.layer_count(),
            slots = neuron_count,
            weights = weight_count,
            context_links = network.context_links.len(),
            "flat network compiled"
        );
        Ok(network)
    }

    /// Стандартная сеть прямого распространения (см. `feedforward`)
    pub fn feedforward(
        input: usize,
        hidden1: usize,
        hidden2: usize,
        output: usize,
        tanh: bool,
    ) -> NetResult<Self> {
        Self::new(&feedforward(input, hidden1, hidden2, output, tanh))
    }

    /// Веса одним вектором (для оптимизаторов "черного ящика")
    pub fn encode_to_array(&self) -> Vec<f32> {
        self.weights.clone()
    }

    /// Длина вектора весов
    pub fn encoded_array_length(&self) -> usize {
        self.weights.len()
    }

    /// Загрузка весов из вектора, длина должна совпадать точно
    pub fn decode_from_array(&mut self, data: &[f32]) -> NetResult<()> {
        if data.len() != self.weights.len() {
            return Err(NetworkError::shape("weight array", self.weights.len(), data.len()));
        }
        self.weights.copy_from_slice(data);
        trace!(weights = data.len(), "weights decoded");
        Ok(())
    }

    /// Случайные веса из [low, high]; границы и ширина диапазона должны быть конечными
    pub fn randomize_uniform(&mut self, rng: &mut dyn RngCore, low: f32, high: f32) -> NetResult<()> {
        let finite = low.is_finite() && high.is_finite() && (high - low).is_finite();
        if !finite || low > high {
            return Err(NetworkError::InvalidRange { low, high });
        }
        self.weights
            .iter_mut()
            .for_each(|w| *w = rng.gen_range(low..=high));
        trace!(low, high, weights = self.weights.len(), "weights randomized");
        Ok(())
    }

    /// Случайные веса из [-1, 1]
    pub fn randomize(&mut self, rng: &mut dyn RngCore) -> NetResult<()> {
        self.randomize_uniform(rng, -1.0, 1.0)
    }

    /// Вес связи: ячейка `from_slot` слоя `from_layer` -> нейрон `to_neuron` слоя `from_layer + 1`
    pub fn weight(&self, from_layer: usize, from_slot: usize, to_neuron: usize) -> NetResult<f32> {
        let index = self.weight_position(from_layer, from_slot, to_neuron)?;
        Ok(self.weights[index])
    }

    /// Запись веса связи (адресация как в `weight`)
    pub fn set_weight(
        &mut self,
        from_layer: usize,
        from_slot: usize,
        to_neuron: usize,
        value: f32,
    ) -> NetResult<()> {
        let index = self.weight_position(from_layer, from_slot, to_neuron)?;
        self.weights[index] = value;
        Ok(())
    }

    fn weight_position(&self, from_layer: usize, from_slot: usize, to_neuron: usize) -> NetResult<usize> {
        if from_layer >= self.weight_index.len() {
            return Err(NetworkError::index("source layer", from_layer, self.weight_index.len()));
        }
        let source_slots = self.layer_counts[from_layer];
        if from_slot >= source_slots {
            return Err(NetworkError::index("source slot", from_slot, source_slots));
        }
        let target_feed = self.layer_feed_counts[from_layer + 1];
        if to_neuron >= target_feed {
            return Err(NetworkError::index("target neuron", to_neuron, target_feed));
        }
        Ok(self.weight_index[from_layer] + to_neuron * source_slots + from_slot)
    }

    /// Количество слоев
    pub fn layer_count(&self) -> usize {
        self.layer_counts.len()
    }

    /// Количество входов (нейронов входного слоя)
    pub fn input_count(&self) -> usize {
        self.layer_feed_counts[0]
    }

    /// Количество выходов (нейронов выходного слоя)
    pub fn output_count(&self) -> usize {
        self.layer_feed_counts[self.layer_count() - 1]
    }

    /// Общее количество ячеек всех слоев
    pub fn neuron_count(&self) -> usize {
        self.layer_output.len()
    }

    /// Есть ли в сети хотя бы одна связь контекста
    pub fn has_context(&self) -> bool {
        !self.context_links.is_empty()
    }

    /// Все веса сети
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Веса для обучающих алгоритмов: менять можно, длину - нет
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Текущие значения всех ячеек (нейроны, смещения, контекст)
    pub fn layer_output(&self) -> &[f32] {
        &self.layer_output
    }

    /// Количество ячеек каждого слоя
    pub fn layer_counts(&self) -> &[usize] {
        &self.layer_counts
    }

    /// Количество нейронов каждого слоя
    pub fn layer_feed_counts(&self) -> &[usize] {
        &self.layer_feed_counts
    }

    /// Размер контекста каждого слоя
    pub fn layer_context_counts(&self) -> &[usize] {
        &self.layer_context_counts
    }

    /// Начало каждого слоя в буфере выходов
    pub fn layer_index(&self) -> &[usize] {
        &self.layer_index
    }

    /// Начало блока весов каждого перехода между слоями
    pub fn weight_index(&self) -> &[usize] {
        &self.weight_index
    }

    /// Значение смещения каждого слоя (0.0 - смещения нет)
    pub fn bias_activation(&self) -> &[f32] {
        &self.bias_activation
    }

    /// Связи контекста
    pub fn context_links(&self) -> &[ContextLink] {
        &self.context_links
    }

    /// Нейроны слоя в буфере выходов
    pub(crate) fn feed_range(&self, layer: usize) -> Range<usize> {
        let start = self.layer_index[layer];
        start..start + self.layer_feed_counts[layer]
    }

    /// Ячейка смещения слоя в буфере выходов
    pub(crate) fn bias_slot(&self, layer: usize) -> Option<usize> {
        (self.bias_activation[layer] != NO_BIAS_ACTIVATION)
            .then(|| self.layer_index[layer] + self.layer_feed_counts[layer])
    }

    /// Блок контекста слоя в буфере выходов
    pub(crate) fn context_range(&self, layer: usize) -> Range<usize> {
        let end = self.layer_index[layer] + self.layer_counts[layer];
        end - self.layer_context_counts[layer]..end
    }
}

fn reject(reason: String) -> NetworkError {
    warn!(%reason, "flat network topology rejected");
    NetworkError::InvalidTopology(reason)
}
