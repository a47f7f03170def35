//! Error types for the interop layer

use crate::bridge::TypeTag;
use thiserror::Error;

/// Result of a typed extraction
pub type AccessResult<T> = Result<T, TypeMismatch>;

/// The host-reported type did not match what an accessor required.
///
/// This is the only error the accessor layer produces. `expected` is the single
/// tag that is valid for the requested shape; `target` names the shape itself,
/// which matters when two shapes share a tag (a record and an array are both
/// `object`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value is not {target}: expected {expected}, found {actual}")]
pub struct TypeMismatch {
    pub target: &'static str,
    pub expected: TypeTag,
    pub actual: TypeTag,
}

impl TypeMismatch {
    pub fn new(target: &'static str, expected: TypeTag, actual: TypeTag) -> Self {
        TypeMismatch {
            target,
            expected,
            actual,
        }
    }
}

/// Failure reported by the host through a bridge primitive.
///
/// The interop layer never catches or translates these; they are handed back
/// to the caller exactly as the bridge produced them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The host raised an exception during the call
    #[error("{message}")]
    Exception { message: String },

    /// `call` named a member that is absent or not invocable
    #[error("TypeError: {method} is not a function")]
    NotCallable { method: String },

    /// The host invoked a callback whose registration was already dropped
    #[error("callback invoked after its registration was released")]
    Released,

    /// The bridge has no way to perform the operation
    #[error("operation not supported by this host: {operation}")]
    Unsupported { operation: &'static str },
}

impl HostError {
    pub fn exception(message: impl Into<String>) -> Self {
        HostError::Exception {
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        HostError::Exception {
            message: format!("TypeError: {}", message.into()),
        }
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        HostError::Exception {
            message: format!("SyntaxError: {}", message.into()),
        }
    }

    pub fn not_callable(method: impl Into<String>) -> Self {
        HostError::NotCallable {
            method: method.into(),
        }
    }
}

/// Error produced by the structural codec
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    /// The host refused to serialize or parse (cyclic structure, malformed text)
    #[error("host serialization failed: {0}")]
    Host(#[from] HostError),

    /// The host's text did not decode into the requested local shape
    #[error("structural decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CodecError {
    /// The type mismatch behind this error, if that is what it is
    pub fn as_type_mismatch(&self) -> Option<&TypeMismatch> {
        match self {
            CodecError::TypeMismatch(mismatch) => Some(mismatch),
            _ => None,
        }
    }
}
