// Callable-Level Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of an error class raised or returned by a wrapped callable
/// (e.g. "RuntimeError", "IllegalStateError"). Rollback rules match on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorKind(String);

impl ErrorKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Kind assigned to unwinds carrying a bare string payload
    pub fn runtime() -> Self {
        Self("RuntimeError".to_string())
    }

    pub fn illegal_state() -> Self {
        Self("IllegalStateError".to_string())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A failure originating in the wrapped callable's own logic.
///
/// This is the error a callable either raises (as an unwind payload) or
/// returns as the failure arm of its result container. Infrastructure
/// failures (begin/commit/rollback) are never represented as BusinessError
/// at the point they occur; they are converted only when a fallible return
/// contract must absorb them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct BusinessError {
    pub kind: ErrorKind,
    pub message: String,
}

impl BusinessError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::runtime(), message)
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::illegal_state(), message)
    }

    /// Unwind the current call stack with this error as the panic payload.
    /// The invoker's capture adapter recovers it with the kind intact.
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }
}
