// Central Error Type for the Engine

use thiserror::Error;

use crate::domain::error::BusinessError;
use crate::port::transaction_manager::ManagerError;

/// Errors surfaced to callers of the transaction invoker.
///
/// `Invocation` means the callable's own logic failed; the remaining
/// variants mean the boundary itself could not be handled, so callers can
/// tell "my logic failed" apart from "the boundary failed to close".
#[derive(Error, Debug)]
pub enum TxError {
    /// Configured manager could not be classified as either protocol.
    /// Fatal, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Boundary could not open; the callable never ran
    #[error("Transaction begin failed: {0}")]
    Begin(ManagerError),

    /// The callable's own business error, after rollback arbitration
    #[error("Invocation failed: {0}")]
    Invocation(BusinessError),

    /// Commit or rollback failed after the callable already ran
    #[error("Transaction resolution failed: {0}")]
    Resolution(ManagerError),

    /// Systemic failure reported by a callback-owning manager
    #[error("Transaction manager failure: {0}")]
    Manager(ManagerError),
}

/// Result type alias using TxError
pub type Result<T> = std::result::Result<T, TxError>;
