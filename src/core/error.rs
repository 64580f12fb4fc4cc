use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Missing or out-of-range input, rejected before any calculation runs.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Inputs are well-formed but the growth model is undefined for them.
    #[error("domain error: {0}")]
    Domain(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
