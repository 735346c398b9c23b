//! Core error types for Rankle.

use thiserror::Error;

/// Result type alias using `RankleError`.
pub type RankleResult<T> = std::result::Result<T, RankleError>;

/// Core error type for Rankle operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RankleError {
    /// Record or operand schema does not match the expected schema.
    #[error("SchemaMismatch: {0}")]
    SchemaMismatch(String),

    /// Value's runtime type disagrees with its attribute's declared domain.
    #[error("TypeMismatch: {0}")]
    TypeMismatch(String),

    /// Attribute lookup against a schema lacking it.
    #[error("AttributeNotFound: {0}")]
    AttributeNotFound(String),

    /// Ordering applied to non-orderable or mismatched domains.
    #[error("NotComparable: {0}")]
    NotComparable(String),

    /// Projection target is not derivable from the source schema.
    #[error("NotSubschema: {0}")]
    NotSubschema(String),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// Evaluation stopped by the cancellation token or a round guard.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Internal error (engine invariant violation, a bug in Rankle).
    #[error("InternalError: {0}")]
    Internal(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl RankleError {
    /// Create a new `SchemaMismatch` error.
    pub fn schema_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create a new `TypeMismatch` error.
    pub fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Create a new `AttributeNotFound` error.
    pub fn attribute_not_found<S: Into<String>>(msg: S) -> Self {
        Self::AttributeNotFound(msg.into())
    }

    /// Create a new `NotComparable` error.
    pub fn not_comparable<S: Into<String>>(msg: S) -> Self {
        Self::NotComparable(msg.into())
    }

    /// Create a new `NotSubschema` error.
    pub fn not_subschema<S: Into<String>>(msg: S) -> Self {
        Self::NotSubschema(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new `Cancelled` error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a new `Internal` error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Ensure a condition holds, returning the named error variant if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::RankleError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with an `Internal` error.
#[macro_export]
macro_rules! internal_err {
    ($($arg:tt)*) => {
        return Err($crate::RankleError::Internal(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RankleError::type_mismatch("expected Int, got Text");
        assert_eq!(err.to_string(), "TypeMismatch: expected Int, got Text");
    }

    #[test]
    fn test_error_constructors() {
        let _ = RankleError::schema_mismatch("record schema differs from table schema");
        let _ = RankleError::attribute_not_found("no attribute 'cost'");
        let _ = RankleError::not_comparable("Int vs Text");
        let _ = RankleError::cancelled("deadline exceeded");
        let _ = RankleError::internal("unexpected state");
    }
}
