//! Error types for the diff crate.

/// Errors that can occur during diff operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A function was passed where a data value was expected.
    #[error("invalid argument: function `{0}` given, object expected")]
    InvalidInput(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
