use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

impl AnalysisError {
    /// Too few usable points for `symbol`
    pub fn too_few_points(symbol: &str, have: usize, need: usize) -> Self {
        AnalysisError::InsufficientData(format!(
            "{} has {} usable daily closes, need at least {}",
            symbol, have, need
        ))
    }

    /// Missing or unusable upstream data rather than a bug in the engine
    pub fn is_data_problem(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientData(_) | AnalysisError::InvalidData(_) | AnalysisError::ProviderError(_)
        )
    }
}
