use thiserror::Error;

/// Errors produced by value conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("function `{0}` cannot be converted to data")]
    FunctionNotData(String),

    #[error("number is not representable in JSON: {0}")]
    NonFiniteNumber(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
