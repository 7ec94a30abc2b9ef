//! Error types for coldispatch operations.

use thiserror::Error;

use crate::engine::EngineError;

/// Result type alias using [`DispatchError`].
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors surfaced to callers of the dispatch layer.
///
/// There is no partial-failure mode: an operation either returns one complete
/// result or one of these errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Unrecognized operand shape or a type combination with no common type.
    #[error("Type error in {operator}: {message}")]
    TypeError { operator: String, message: String },

    /// The execution engine rejected the operation. The message is the
    /// engine's own, unmodified.
    #[error("{0}")]
    EngineLogicError(String),
}

impl DispatchError {
    /// Builds a [`DispatchError::TypeError`] for the named operator.
    pub fn type_error(operator: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::TypeError {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Returns the operator name carried by a type error.
    #[must_use]
    pub fn operator(&self) -> Option<&str> {
        match self {
            DispatchError::TypeError { operator, .. } => Some(operator),
            DispatchError::EngineLogicError(_) => None,
        }
    }

    /// Returns true if this is a [`DispatchError::TypeError`].
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        matches!(self, DispatchError::TypeError { .. })
    }
}

impl From<EngineError> for DispatchError {
    fn from(err: EngineError) -> Self {
        DispatchError::EngineLogicError(err.to_string())
    }
}
