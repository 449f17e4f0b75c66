use crate::*;

/// Обучающая выборка: пары (вход, идеальный выход)
pub trait Dataset {
    fn count(&self) -> usize;
    fn input_size(&self) -> usize;
    fn ideal_size(&self) -> usize;
    fn pair(&self, index: usize) -> (&[f32], &[f32]);
}

/// Выборка в памяти
#[derive(Clone, Debug, Default)]
pub struct BasicDataset {
    input_size: usize,
    ideal_size: usize,
    pairs: Vec<(Vec<f32>, Vec<f32>)>,
}

impl BasicDataset {
    pub fn new(input_size: usize, ideal_size: usize) -> Self {
        Self {
            input_size,
            ideal_size,
            pairs: Vec::new(),
        }
    }

    /// Размеры берутся из первой пары
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Vec<f32>, Vec<f32>)>,
    ) -> NetResult<Self> {
        let mut pairs = pairs.into_iter().peekable();
        let (input_size, ideal_size) = pairs
            .peek()
            .map(|(input, ideal)| (input.len(), ideal.len()))
            .unwrap_or_default();
        let mut data = Self::new(input_size, ideal_size);
        for (input, ideal) in pairs {
            data.push(input, ideal)?;
        }
        Ok(data)
    }

    pub fn push(&mut self, input: Vec<f32>, ideal: Vec<f32>) -> NetResult<()> {
        if input.len() != self.input_size {
            return Err(NetworkError::shape("dataset input", self.input_size, input.len()));
        }
        if ideal.len() != self.ideal_size {
            return Err(NetworkError::shape("dataset ideal", self.ideal_size, ideal.len()));
        }
        self.pairs.push((input, ideal));
        Ok(())
    }
}

impl Dataset for BasicDataset {
    fn count(&self) -> usize {
        self.pairs.len()
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn ideal_size(&self) -> usize {
        self.ideal_size
    }

    fn pair(&self, index: usize) -> (&[f32], &[f32]) {
        let (input, ideal) = &self.pairs[index];
        (input.as_slice(), ideal.as_slice())
    }
}
