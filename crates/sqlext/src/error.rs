//! Error types for sqlext

use thiserror::Error;

/// Result type alias for sqlext operations
pub type SqlExtResult<T> = Result<T, SqlExtError>;

/// Errors raised while resolving metadata or building a statement.
///
/// Every variant is a local validation failure; nothing is retried and no
/// partially built statement is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlExtError {
    /// The table name resolved to an empty or blank string
    #[error("No table was provided for '{0}' (empty or blank)")]
    NoTableProvided(String),

    /// The resolved field list is empty
    #[error("No properties were provided for '{0}'")]
    NoPropertiesProvided(String),

    /// An implicit primary key was required but none is declared
    #[error("No primary key found for '{0}'")]
    NoPrimaryKeyFound(String),

    /// An implicit primary key was required but several fields claim it
    #[error("Ambiguous primary key for '{entity}': {candidates:?}")]
    AmbiguousPrimaryKey {
        entity: String,
        candidates: Vec<String>,
    },

    /// A diff-update found no changed non-key fields
    #[error("No difference found between the two instances of '{0}'")]
    NoDifferenceFound(String),

    /// A required field held no value
    #[error("Column '{0}' cannot be null")]
    MissingRequiredValue(String),

    /// A selector or predicate referenced something other than a direct field
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
}

impl SqlExtError {
    /// Create an invalid expression error
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression(message.into())
    }

    /// Create a missing required value error for a column
    pub fn missing_required(column: impl Into<String>) -> Self {
        Self::MissingRequiredValue(column.into())
    }

    /// Check if this is a primary key resolution error
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::NoPrimaryKeyFound(_) | Self::AmbiguousPrimaryKey { .. }
        )
    }

    /// Check if this is a "no difference" error
    pub fn is_no_difference(&self) -> bool {
        matches!(self, Self::NoDifferenceFound(_))
    }

    /// Check if this is an invalid expression error
    pub fn is_invalid_expression(&self) -> bool {
        matches!(self, Self::InvalidExpression(_))
    }
}
