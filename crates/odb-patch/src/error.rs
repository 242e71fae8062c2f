//! Error types for the patch crate.

use odb_diff::DiffError;
use odb_types::Value;

/// Errors produced while compiling an edit.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The differ rejected its input.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// The original object carries no `id` to address the edit to.
    #[error("original object has no `id` field")]
    MissingObjectId,

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),
}

/// Convenience alias for compile results.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors produced while parsing a path string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty segment in path `{0}`")]
    EmptySegment(String),

    #[error("unterminated index in path `{0}`")]
    UnterminatedIndex(String),

    #[error("invalid index `{index}` in path `{path}`")]
    InvalidIndex { path: String, index: String },
}

/// Errors produced while applying an edit entry to an object.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("current value mismatch at `{path}`: expected {expected}, found {actual}")]
    PriorValueMismatch {
        path: String,
        expected: Value,
        actual: Value,
    },

    #[error("edit not reflected at `{path}`: expected {expected}, found {actual}")]
    NotApplied {
        path: String,
        expected: Value,
        actual: Value,
    },

    #[error("change at `{0}` replaces an existing value but no current value was given")]
    MissingPriorValue(String),

    #[error("path not found: `{0}`")]
    PathNotFound(String),

    #[error("index {index} out of range at `{path}` (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("increment is only allowed for numbers: `{path}` holds a {found}")]
    IncrementNonNumber { path: String, found: &'static str },

    #[error("cannot append a {value} to the {found} at `{path}`")]
    AppendMismatch {
        path: String,
        found: &'static str,
        value: &'static str,
    },

    #[error("the root value cannot be the target of a change")]
    RootTarget,
}

/// Convenience alias for apply results.
pub type ApplyResult<T> = Result<T, ApplyError>;
