//! Error types for the quarry crate.

use thiserror::Error;

/// Errors raised by collection transforms, filters, sorts and queries.
///
/// Every variant is reported by the call that detects the problem and is
/// returned to the caller unchanged. Absent keys and attributes are never
/// errors; lookups return `None` or [`Value::Null`](crate::Value::Null).
#[derive(Debug, Error)]
pub enum QuarryError {
    /// Operator token is not registered in the operator table.
    #[error("missing filter for operator: {token}")]
    UnknownOperator { token: String },

    /// Filter argument is neither a list of filter rules nor a predicate.
    #[error("invalid filter: {0}")]
    InvalidFilterSpec(String),

    /// Sort criteria are malformed.
    #[error("invalid sort criteria: {0}")]
    InvalidSortSpec(String),

    /// An argument is outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operand of the `match` operator is not a valid regular expression.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding failed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl QuarryError {
    pub(crate) fn unknown_operator(token: impl Into<String>) -> Self {
        QuarryError::UnknownOperator {
            token: token.into(),
        }
    }
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QuarryError>;
