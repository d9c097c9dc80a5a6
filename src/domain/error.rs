use thiserror::Error;
use validator::ValidationErrors;

/// Errors raised at the engine boundary.
///
/// The numeric models themselves are total over validated input; these errors
/// only surface when a caller hands the engine something malformed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid supply curve: {0}")]
    InvalidSupplyCurve(String),

    #[error("Unknown utility: {0}")]
    UnknownUtility(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
