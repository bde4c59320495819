use thiserror::Error;

/// Errors raised by dimension reduction preprocessors.
///
/// Fallible operations return `anyhow::Result`; the concrete kind can be
/// recovered with `err.downcast_ref::<DimRedError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimRedError {
    /// Malformed or shape-incompatible features, vectors or distance matrices.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The preprocessor has to be initialized before it can be applied.
    #[error("{0} has not been initialized")]
    NotInitialized(String),

    /// The configured distance/kernel combination is not supported.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A target dimension that is neither -1 (auto) nor strictly positive.
    #[error("invalid target dimension {0}, expected -1 (auto) or a positive value")]
    InvalidTargetDim(i64),
}
