use crate::*;

/// Сеть прямого распространения на 2-4 слоя.
/// Нулевое количество нейронов скрытого слоя - слоя нет.
/// Вход: linear + смещение, скрытые: tanh/sigmoid + смещение, выход: tanh/sigmoid без смещения.
pub fn feedforward(
    input: usize,
    hidden1: usize,
    hidden2: usize,
    output: usize,
    tanh: bool,
) -> Vec<LayerTopology> {
    let activation: Arc<dyn ActivationFunction> = if tanh {
        Arc::new(Activation::Tanh)
    } else {
        Arc::new(Activation::Sigmoid)
    };
    let mut layers = vec![
        LayerTopology::new(input, Activation::Linear).with_bias(DEFAULT_BIAS_ACTIVATION),
    ];
    for hidden in [hidden1, hidden2].into_iter().filter(|h| *h > 0) {
        layers.push(
            LayerTopology::with_shared(hidden, activation.clone()).with_bias(DEFAULT_BIAS_ACTIVATION),
        );
    }
    layers.push(LayerTopology::with_shared(output, activation));
    layers
}

/// Сеть Элмана: контекст входного слоя питается скрытым слоем
pub fn elman(input: usize, hidden: usize, output: usize, activation: Activation) -> Vec<LayerTopology> {
    recurrent(input, hidden, output, activation, 1)
}

/// Сеть Джордана: контекст входного слоя питается выходным слоем
pub fn jordan(input: usize, hidden: usize, output: usize, activation: Activation) -> Vec<LayerTopology> {
    recurrent(input, hidden, output, activation, 2)
}

fn recurrent(
    input: usize,
    hidden: usize,
    output: usize,
    activation: Activation,
    context_source: usize,
) -> Vec<LayerTopology> {
    vec![
        LayerTopology::new(input, Activation::Linear)
            .with_bias(DEFAULT_BIAS_ACTIVATION)
            .with_context_from(context_source),
        LayerTopology::new(hidden, activation).with_bias(DEFAULT_BIAS_ACTIVATION),
        LayerTopology::new(output, activation),
    ]
}
