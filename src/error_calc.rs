use crate::*;

/// Накопитель ошибки по выборке
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorCalculation {
    global_error: f64,
    set_size: usize,
}

impl ErrorCalculation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Учитываются только пары (выход, идеал), лишние значения отбрасываются
    pub fn update_error(&mut self, actual: &[f32], ideal: &[f32]) {
        for (a, i) in actual.iter().zip(ideal) {
            let delta = f64::from(*i) - f64::from(*a);
            self.global_error += delta * delta;
            self.set_size += 1;
        }
    }

    /// Среднеквадратичная ошибка (MSE)
    pub fn calculate_mse(&self) -> f64 {
        if self.set_size == 0 {
            return 0.0;
        }
        self.global_error / self.set_size as f64
    }

    /// Корень из MSE (RMS)
    pub fn calculate_rms(&self) -> f64 {
        self.calculate_mse().sqrt()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl FlatNetwork {
    /// RMS ошибка сети по выборке. Контекст перед расчетом не сбрасывается.
    pub fn calculate_error<D: Dataset + ?Sized>(&mut self, data: &D) -> NetResult<f64> {
        if data.input_size() != self.input_count() {
            return Err(NetworkError::shape("dataset input", self.input_count(), data.input_size()));
        }
        if data.ideal_size() != self.output_count() {
            return Err(NetworkError::shape("dataset ideal", self.output_count(), data.ideal_size()));
        }
        let mut calc = ErrorCalculation::new();
        let mut actual = vec![0.0; self.output_count()];
        for index in 0..data.count() {
            let (input, ideal) = data.pair(index);
            if ideal.len() != actual.len() {
                return Err(NetworkError::shape("dataset ideal", actual.len(), ideal.len()));
            }
            self.compute_into(input, &mut actual)?;
            calc.update_error(&actual, ideal);
        }
        let error = calc.calculate_rms();
        trace!(pairs = data.count(), error, "error calculated");
        Ok(error)
    }
}
