use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PopSynthError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported bin type: {0} (expected 'lin', 'log' or 'ln')")]
    UnsupportedBinType(String),

    #[error("Unsupported normalisation: {0} (expected 'none', 'max' or 'prob')")]
    UnsupportedNormalization(String),

    #[error("Invalid bin count: {0}")]
    InvalidBinCount(usize),

    #[error("Invalid significance level: sigma = {0}")]
    InvalidSignificance(f64),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, PopSynthError>;
