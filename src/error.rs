/// Ошибки компиляции и расчета сети
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("invalid range: low={low} > high={high}")]
    InvalidRange { low: f32, high: f32 },

    #[error("invalid topology config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read topology config: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetResult<T> = std::result::Result<T, NetworkError>;

impl NetworkError {
    pub(crate) fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        NetworkError::ShapeMismatch { what, expected, actual }
    }

    pub(crate) fn index(what: &'static str, index: usize, len: usize) -> Self {
        NetworkError::IndexOutOfRange { what, index, len }
    }
}
