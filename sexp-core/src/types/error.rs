//! Marshaling error types.
//!
//! Errors carry a stable `error_type()` string so hosts can branch on the
//! failure without parsing messages. "Not convertible" is deliberately absent
//! here: reifiers report it as `Ok(None)`.

use std::fmt;

use crate::runtime::{RawHandle, SexpType};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MarshalError>;

/// Error kind enum for marshaling operations.
///
/// Each variant corresponds to a specific error condition and maps to a
/// stable `error_type()` string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// A predicate or coercion received an absent handle.
    #[error("null handle")]
    NullHandle,
    /// The handle does not refer to a live value of this runtime.
    #[error("invalid handle: {handle}")]
    InvalidHandle { handle: RawHandle },
    /// The runtime refused the requested conversion.
    #[error("cannot coerce {from} to {to}: {message}")]
    CoercionFailed {
        from: SexpType,
        to: SexpType,
        message: String,
    },
    /// A value did not have the expected native type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    /// An element index was outside the view.
    #[error("index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    /// Any other failure reported by the runtime.
    #[error("native runtime error: {message}")]
    NativeError { message: String },
    /// The one-time access demand was refused.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },
    /// Configuration error.
    #[error("config error: {message}")]
    ConfigError { message: String },
    /// TOML parsing error.
    #[error("toml error: {message}")]
    TomlError { message: String },
    /// I/O error.
    #[error("io error: {message}")]
    IoError { message: String },
}

impl ErrorKind {
    /// Get the error type as a string.
    ///
    /// These strings are stable and must not change.
    pub fn error_type(&self) -> &'static str {
        match self {
            ErrorKind::NullHandle => "null_handle",
            ErrorKind::InvalidHandle { .. } => "invalid_handle",
            ErrorKind::CoercionFailed { .. } => "coercion_failed",
            ErrorKind::TypeMismatch { .. } => "type_mismatch",
            ErrorKind::IndexOutOfBounds { .. } => "index_out_of_bounds",
            ErrorKind::NativeError { .. } => "native_error",
            ErrorKind::PermissionDenied { .. } => "permission_denied",
            ErrorKind::ConfigError { .. } => "config_error",
            ErrorKind::TomlError { .. } => "toml_error",
            ErrorKind::IoError { .. } => "io_error",
        }
    }
}

/// Main error type for marshaling operations.
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalError(Box<ErrorKind>);

impl MarshalError {
    /// Create a new error from an error kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Get the stable error type string.
    pub fn error_type(&self) -> &'static str {
        self.kind().error_type()
    }

    // Convenience constructors for common error types

    /// Create a "null handle" error.
    pub fn null_handle() -> Self {
        Self::new(ErrorKind::NullHandle)
    }

    /// Create an "invalid handle" error.
    pub fn invalid_handle(handle: RawHandle) -> Self {
        Self::new(ErrorKind::InvalidHandle { handle })
    }

    /// Create a "coercion failed" error.
    pub fn coercion_failed(from: SexpType, to: SexpType, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CoercionFailed {
            from,
            to,
            message: message.into(),
        })
    }

    /// Create a "type mismatch" error.
    pub fn type_mismatch(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }

    /// Create an "index out of bounds" error.
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds { index, len })
    }

    /// Create a "native error".
    pub fn native(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NativeError {
            message: message.into(),
        })
    }

    /// Create a "permission denied" error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied {
            message: message.into(),
        })
    }

    /// Create a "config error".
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigError {
            message: message.into(),
        })
    }

    /// Check if this is a NullHandle error.
    pub fn is_null_handle(&self) -> bool {
        matches!(self.kind(), ErrorKind::NullHandle)
    }

    /// Check if this is a CoercionFailed error.
    pub fn is_coercion_failed(&self) -> bool {
        matches!(self.kind(), ErrorKind::CoercionFailed { .. })
    }

    /// Check if this is an InvalidHandle error.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidHandle { .. })
    }

    /// Check if this is a PermissionDenied error.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.kind(), ErrorKind::PermissionDenied { .. })
    }
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MarshalError {}

impl From<ErrorKind> for MarshalError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

// Conversion from common error types

impl From<std::io::Error> for MarshalError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::IoError {
            message: e.to_string(),
        })
    }
}

impl From<toml::de::Error> for MarshalError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(ErrorKind::TomlError {
            message: e.to_string(),
        })
    }
}

impl From<toml::ser::Error> for MarshalError {
    fn from(e: toml::ser::Error) -> Self {
        Self::new(ErrorKind::TomlError {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types_are_stable() {
        assert_eq!(MarshalError::null_handle().error_type(), "null_handle");
        assert_eq!(
            MarshalError::coercion_failed(SexpType::List, SexpType::Numeric, "nope").error_type(),
            "coercion_failed"
        );
        assert_eq!(MarshalError::index_out_of_bounds(3, 2).error_type(), "index_out_of_bounds");
        assert_eq!(MarshalError::permission_denied("x").error_type(), "permission_denied");
    }

    #[test]
    fn test_coercion_failure_message_names_both_types() {
        let err = MarshalError::coercion_failed(
            SexpType::List,
            SexpType::Numeric,
            "(list) object cannot be coerced to type 'double'",
        );
        let msg = err.to_string();
        assert!(msg.contains("list"));
        assert!(msg.contains("double"));
        assert!(err.is_coercion_failed());
        assert!(!err.is_null_handle());
    }
}
