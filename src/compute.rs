use crate::*;

impl FlatNetwork {
    /// Расчет в прямом направлении
    pub fn compute(&mut self, input: &[f32]) -> NetResult<Vec<f32>> {
        let mut output = vec![0.0; self.output_count()];
        self.compute_into(input, &mut output)?;
        Ok(output)
    }

    /// Расчет в прямом направлении без выделения памяти.
    /// Контекст, записанный этим вызовом, будет прочитан только следующим.
    pub fn compute_into(&mut self, input: &[f32], output: &mut [f32]) -> NetResult<()> {
        if input.len() != self.input_count() {
            return Err(NetworkError::shape("input", self.input_count(), input.len()));
        }
        if output.len() != self.output_count() {
            return Err(NetworkError::shape("output", self.output_count(), output.len()));
        }
        let input_range = self.feed_range(0);
        self.layer_output[input_range].copy_from_slice(input);
        //от входного слоя к выходному
        for source in 0..self.layer_count() - 1 {
            self.compute_layer(source);
        }
        self.update_context();
        let output_range = self.feed_range(self.layer_count() - 1);
        output.copy_from_slice(&self.layer_output[output_range]);
        Ok(())
    }

    /// Нейроны слоя `source + 1` по всем ячейкам слоя `source`
    /// (нейроны, смещение и контекст обрабатываются одинаково)
    fn compute_layer(&mut self, source: usize) {
        let target = source + 1;
        let source_start = self.layer_index[source];
        let source_slots = self.layer_counts[source];
        let target_feed = self.layer_feed_counts[target];
        let weights_start = self.weight_index[source];
        let block = &self.weights[weights_start..weights_start + source_slots * target_feed];

        //слой-источник всегда лежит в буфере перед слоем-приемником
        let (head, tail) = self.layer_output.split_at_mut(self.layer_index[target]);
        let inputs = &head[source_start..source_start + source_slots];
        let outputs = &mut tail[..target_feed];
        for (out, row) in outputs.iter_mut().zip(block.chunks_exact(source_slots)) {
            *out = row.iter().zip(inputs).map(|(w, x)| w * x).sum();
        }
        self.activation_functions[target].activate(outputs);
    }

    /// Копирование выходов слоев-источников в контекст
    fn update_context(&mut self) {
        for link in &self.context_links {
            let start = self.layer_index[link.source];
            self.layer_output
                .copy_within(start..start + link.len, link.offset);
        }
    }

    /// Сброс контекста в 0 и восстановление смещений, веса не меняются
    pub fn clear_context(&mut self) {
        for layer in 0..self.layer_count() {
            if let Some(slot) = self.bias_slot(layer) {
                self.layer_output[slot] = self.bias_activation[layer];
            }
            let range = self.context_range(layer);
            self.layer_output[range].fill(0.0);
        }
        trace!("context cleared");
    }

    /// Текущий контекст слоя
    pub fn context(&self, layer: usize) -> NetResult<&[f32]> {
        if layer >= self.layer_count() {
            return Err(NetworkError::index("layer", layer, self.layer_count()));
        }
        Ok(&self.layer_output[self.context_range(layer)])
    }

    /// Замена контекста слоя (например, чтобы "заморозить" состояние)
    pub fn set_context(&mut self, layer: usize, values: &[f32]) -> NetResult<()> {
        if layer >= self.layer_count() {
            return Err(NetworkError::index("layer", layer, self.layer_count()));
        }
        let range = self.context_range(layer);
        if values.len() != range.len() {
            return Err(NetworkError::shape("context", range.len(), values.len()));
        }
        self.layer_output[range].copy_from_slice(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_one(output: Activation) -> FlatNetwork {
        FlatNetwork::new(&[
            LayerTopology::new(2, Activation::Linear).with_bias(DEFAULT_BIAS_ACTIVATION),
            LayerTopology::new(1, output),
        ])
        .unwrap()
    }

    #[test]
    fn bias_only_sum() {
        let mut net = two_one(Activation::Linear);
        net.decode_from_array(&[1.0, 1.0, 1.0]).unwrap();
        let actual = net.compute(&[0.0, 0.0]).unwrap();
        assert_eq!(actual, vec![1.0]);

        let mut net = two_one(Activation::Sigmoid);
        net.decode_from_array(&[1.0, 1.0, 1.0]).unwrap();
        let actual = net.compute(&[0.0, 0.0]).unwrap();
        assert_relative_eq!(actual[0], 0.7310586, epsilon = 1e-6);
    }

    #[test]
    fn weighted_sum() {
        let mut net = two_one(Activation::Sigmoid);
        net.decode_from_array(&[2.0, -1.0, 0.0]).unwrap();
        let actual = net.compute(&[3.0, 4.0]).unwrap();
        assert_relative_eq!(actual[0], 0.8807971, epsilon = 1e-6);
        //выход сохранен в буфере
        assert_eq!(net.layer_output()[3], actual[0]);
        assert_eq!(&net.layer_output()[..3], &[3.0, 4.0, 1.0]);
    }

    #[test]
    fn hidden_layer() {
        //вход 2 + смещение -> скрытый 2 (relu) + смещение -> выход 1 (linear)
        let mut net = FlatNetwork::new(&[
            LayerTopology::new(2, Activation::Linear).with_bias(DEFAULT_BIAS_ACTIVATION),
            LayerTopology::new(2, Activation::Relu).with_bias(0.5),
            LayerTopology::new(1, Activation::Linear),
        ])
        .unwrap();
        net.decode_from_array(&[
            1.0, 2.0, 0.5, //h1 = 0.5 + 2*2 + 0.5 = 5
            -1.0, -1.0, 0.0, //h2 = relu(-2.5) = 0
            2.0, 3.0, 4.0, //y = 2*5 + 3*0 + 4*0.5
        ])
        .unwrap();
        let actual = net.compute(&[0.5, 2.0]).unwrap();
        assert_relative_eq!(actual[0], 12.0);
        assert_eq!(&net.layer_output()[3..6], &[5.0, 0.0, 0.5]);
    }

    #[test]
    fn shape_mismatch_keeps_state() {
        let mut net = two_one(Activation::Sigmoid);
        net.decode_from_array(&[0.3, 0.2, 0.1]).unwrap();
        net.compute(&[1.0, 1.0]).unwrap();
        let before = net.layer_output().to_vec();

        let err = net.compute(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::ShapeMismatch { what: "input", expected: 2, actual: 3 }
        ));
        let mut output = [0.0f32; 2];
        assert!(net.compute_into(&[5.0, 5.0], &mut output).is_err());
        assert_eq!(net.layer_output(), before.as_slice());
    }

    #[test]
    fn deterministic_after_clear() {
        let mut net = FlatNetwork::new(&elman(3, 4, 2, Activation::Tanh)).unwrap();
        net.randomize(&mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let input = [0.1, -0.7, 0.4];

        net.clear_context();
        let first = net.compute(&input).unwrap();
        net.compute(&input).unwrap();
        net.clear_context();
        let second = net.compute(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn context_lag() {
        let mut net = FlatNetwork::new(&elman(1, 2, 1, Activation::Tanh)).unwrap();
        net.weights_mut().fill(0.5);
        let input = [0.7];

        let first = net.compute(&input).unwrap();
        //в контексте лежат выходы скрытого слоя первого расчета
        let hidden = net.layer_output()[net.feed_range(1)].to_vec();
        let frozen = net.context(0).unwrap().to_vec();
        assert_eq!(frozen, hidden);

        let second = net.compute(&input).unwrap();
        assert_ne!(first, second);

        //тот же контекст -> тот же результат
        net.set_context(0, &frozen).unwrap();
        let third = net.compute(&input).unwrap();
        assert_eq!(second, third);
    }

    #[test]
    fn self_context_lag() {
        //скрытый слой питает собственный контекст
        let mut net = FlatNetwork::new(&[
            LayerTopology::new(1, Activation::Linear).with_bias(DEFAULT_BIAS_ACTIVATION),
            LayerTopology::new(1, Activation::Linear)
                .with_bias(DEFAULT_BIAS_ACTIVATION)
                .with_context_from(1),
            LayerTopology::new(1, Activation::Linear),
        ])
        .unwrap();
        //h = x; y = h + ctx
        net.decode_from_array(&[1.0, 0.0, 1.0, 0.0, 1.0]).unwrap();
        assert_eq!(net.compute(&[2.0]).unwrap(), vec![2.0]);
        assert_eq!(net.context(1).unwrap(), &[2.0]);
        assert_eq!(net.compute(&[3.0]).unwrap(), vec![5.0]);
        assert_eq!(net.compute(&[1.0]).unwrap(), vec![4.0]);
    }

    #[test]
    fn forward_context_lag() {
        //вход питает контекст следующего слоя: y = предыдущий x
        let mut net = FlatNetwork::new(&[
            LayerTopology::new(1, Activation::Linear).with_bias(DEFAULT_BIAS_ACTIVATION),
            LayerTopology::new(1, Activation::Linear)
                .with_bias(DEFAULT_BIAS_ACTIVATION)
                .with_context_from(0),
            LayerTopology::new(1, Activation::Linear),
        ])
        .unwrap();
        //скрытый: [h, смещение, контекст]
        net.decode_from_array(&[1.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(net.compute(&[2.0]).unwrap(), vec![0.0]);
        assert_eq!(net.context(1).unwrap(), &[2.0]);
        assert_eq!(net.compute(&[3.0]).unwrap(), vec![2.0]);
        assert_eq!(net.compute(&[7.0]).unwrap(), vec![3.0]);

        //скрытый слой 1 питает контекст скрытого слоя 2
        let mut net = FlatNetwork::new(&[
            LayerTopology::new(1, Activation::Linear).with_bias(DEFAULT_BIAS_ACTIVATION),
            LayerTopology::new(1, Activation::Linear).with_bias(DEFAULT_BIAS_ACTIVATION),
            LayerTopology::new(1, Activation::Linear)
                .with_bias(DEFAULT_BIAS_ACTIVATION)
                .with_context_from(1),
            LayerTopology::new(1, Activation::Linear),
        ])
        .unwrap();
        net.decode_from_array(&[1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(net.compute(&[4.0]).unwrap(), vec![0.0]);
        assert_eq!(net.context(2).unwrap(), &[4.0]);
        assert_eq!(net.compute(&[5.0]).unwrap(), vec![4.0]);
        net.clear_context();
        assert_eq!(net.compute(&[6.0]).unwrap(), vec![0.0]);
    }

    #[test]
    fn jordan_context() {
        let mut net = FlatNetwork::new(&jordan(1, 1, 1, Activation::Linear)).unwrap();
        //вход: [x, смещение, контекст]; скрытый: [h, смещение]
        net.decode_from_array(&[1.0, 0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(net.compute(&[1.0]).unwrap(), vec![1.0]);
        assert_eq!(net.context(0).unwrap(), &[1.0]);
        assert_eq!(net.compute(&[1.0]).unwrap(), vec![2.0]);
        assert_eq!(net.compute(&[1.0]).unwrap(), vec![3.0]);
        net.clear_context();
        assert_eq!(net.compute(&[1.0]).unwrap(), vec![1.0]);
    }

    #[test]
    fn bias_immutability() {
        let mut net = FlatNetwork::new(&elman(2, 3, 1, Activation::Sigmoid)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..5 {
            net.randomize_uniform(&mut rng, -2.0, 2.0).unwrap();
            net.compute(&[0.3, 0.9]).unwrap();
        }
        net.clear_context();
        for layer in 0..net.layer_count() {
            if let Some(slot) = net.bias_slot(layer) {
                assert_eq!(net.layer_output()[slot], net.bias_activation()[layer]);
            }
            assert!(net.context(layer).unwrap().iter().all(|v| *v == 0.0));
        }
        assert!(net.weights().iter().any(|w| *w != 0.0));
    }

    #[test]
    fn context_access_errors() {
        let mut net = FlatNetwork::new(&elman(1, 2, 1, Activation::Tanh)).unwrap();
        assert!(matches!(net.context(3), Err(NetworkError::IndexOutOfRange { .. })));
        assert!(matches!(
            net.set_context(0, &[1.0]),
            Err(NetworkError::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
        assert_eq!(net.context(2).unwrap(), &[] as &[f32]);
    }

    #[test]
    fn model_check() {
        //сравним с эталонной моделью candle (Linear + Sigmoid)
        use candle_core::{Device, Tensor};
        use candle_nn::{seq, Linear, Module};

        let mut net = FlatNetwork::feedforward(3, 2, 0, 1, false).unwrap();
        net.randomize(&mut ChaCha8Rng::from_seed(Default::default())).unwrap();
        let input = vec![0.5f32, 0.6, 0.7];
        let actual = net.compute(&input).unwrap();

        //веса слоя (кол.нейр, кол.вх.связей) и смещения отдельно
        let linear = |layer: usize| {
            let slots = net.layer_counts()[layer];
            let feed = net.layer_feed_counts()[layer];
            let neurons = net.layer_feed_counts()[layer + 1];
            let start = net.weight_index()[layer];
            let mut w: Vec<f32> = Vec::new();
            let mut b: Vec<f32> = Vec::new();
            for row in net.weights()[start..start + slots * neurons].chunks_exact(slots) {
                w.extend_from_slice(&row[..feed]);
                b.push(row[feed] * net.bias_activation()[layer]);
            }
            let wt_mx = Tensor::new(w, &Device::Cpu).unwrap()
                .reshape((neurons, feed)).unwrap();
            let bt_mx = Tensor::new(b, &Device::Cpu).unwrap()
                .reshape((1, neurons)).unwrap();
            Linear::new(wt_mx, Some(bt_mx))
        };
        let model = seq()
            .add(linear(0))
            .add(candle_nn::Activation::Sigmoid)
            .add(linear(1))
            .add(candle_nn::Activation::Sigmoid);
        let xs = Tensor::new(input, &Device::Cpu).unwrap()
            .reshape((1, 3)).unwrap();
        let expected = model.forward(&xs).unwrap()
            .reshape(1).unwrap()
            .to_vec1::<f32>().unwrap();

        assert_relative_eq!(actual.as_slice(), expected.as_slice(), epsilon = 1e-5);
    }
}
