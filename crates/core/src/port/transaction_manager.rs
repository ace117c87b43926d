// Transaction Manager Ports (Direct and Managed protocols)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::error::{BusinessError, ErrorKind};
use crate::domain::policy::TxPolicy;

/// Phase of the manager interaction that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerPhase {
    Begin,
    Commit,
    Rollback,
    Execute,
}

impl ManagerPhase {
    /// Error kind used when a fallible contract must absorb this failure
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ManagerPhase::Begin => ErrorKind::new("BeginError"),
            ManagerPhase::Commit => ErrorKind::new("CommitError"),
            ManagerPhase::Rollback => ErrorKind::new("RollbackError"),
            ManagerPhase::Execute => ErrorKind::new("ManagerError"),
        }
    }
}

impl std::fmt::Display for ManagerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManagerPhase::Begin => write!(f, "begin"),
            ManagerPhase::Commit => write!(f, "commit"),
            ManagerPhase::Rollback => write!(f, "rollback"),
            ManagerPhase::Execute => write!(f, "execute"),
        }
    }
}

/// Infrastructure-level failure reported by a transaction manager.
///
/// Never subject to the rollback predicate: a failing manager already
/// implies a rollback-equivalent disposition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transaction {phase} failed: {message}")]
pub struct ManagerError {
    pub phase: ManagerPhase,
    pub message: String,
}

impl ManagerError {
    pub fn begin(message: impl Into<String>) -> Self {
        Self {
            phase: ManagerPhase::Begin,
            message: message.into(),
        }
    }

    pub fn commit(message: impl Into<String>) -> Self {
        Self {
            phase: ManagerPhase::Commit,
            message: message.into(),
        }
    }

    pub fn rollback(message: impl Into<String>) -> Self {
        Self {
            phase: ManagerPhase::Rollback,
            message: message.into(),
        }
    }

    pub fn execute(message: impl Into<String>) -> Self {
        Self {
            phase: ManagerPhase::Execute,
            message: message.into(),
        }
    }

    /// Convert to a failure value for fallible return contracts
    pub fn into_business(self) -> BusinessError {
        BusinessError::new(self.phase.error_kind(), self.message)
    }
}

/// Opaque token for one open transaction boundary.
///
/// Created by the manager at begin time and exclusively owned by it; the
/// evaluator only marks rollback-only and reads the flags. Resolution
/// (commit or rollback) consumes the handle on the direct protocol; the
/// managed protocol destroys it when `execute` returns.
#[derive(Debug)]
pub struct BoundaryHandle {
    id: Uuid,
    rollback_only: AtomicBool,
    completed: AtomicBool,
}

impl BoundaryHandle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            rollback_only: AtomicBool::new(false),
            completed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mark the boundary so that resolution rolls back instead of committing
    pub fn set_rollback_only(&self) {
        self.rollback_only.store(true, Ordering::SeqCst);
    }

    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only.load(Ordering::SeqCst)
    }

    /// Whether the boundary is still awaiting resolution
    pub fn is_active(&self) -> bool {
        !self.completed.load(Ordering::SeqCst)
    }

    /// Called by the owning manager once resolution finished (either way)
    pub fn mark_completed(&self) {
        self.completed.store(true, Ordering::SeqCst);
    }
}

impl Default for BoundaryHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Manager the engine drives directly with explicit begin/commit/rollback
pub trait DirectTransactionManager: Send + Sync {
    /// Open a new boundary. Failure here is fatal; the callable never runs.
    fn begin(&self, policy: &TxPolicy) -> Result<BoundaryHandle, ManagerError>;

    /// Finalize the boundary. A manager honoring a rollback-only handle
    /// performs a rollback internally and still reports operational
    /// success; the returned error only signals that finalizing failed.
    fn commit(&self, handle: BoundaryHandle) -> Result<(), ManagerError>;

    /// Roll the boundary back after a raised error
    fn rollback(&self, handle: BoundaryHandle) -> Result<(), ManagerError>;
}

/// Manager that insists on owning the callable invocation itself.
///
/// `execute` begins a transaction, invokes `body` exactly once with the
/// open handle, then commits or rolls back based on the handle's
/// rollback-only flag. The body smuggles its value out through captured
/// state, which keeps the port object-safe.
pub trait ManagedTransactionManager: Send + Sync {
    fn execute(
        &self,
        policy: &TxPolicy,
        body: &mut dyn FnMut(&BoundaryHandle),
    ) -> Result<(), ManagerError>;
}

/// Polymorphic capability over the two manager protocols.
/// Selected once at wiring time; an unclassifiable manager is represented
/// by the absence of a coordinator and fails fast at invocation.
#[derive(Clone)]
pub enum Coordinator {
    /// Engine drives begin/commit/rollback explicitly
    Direct(Arc<dyn DirectTransactionManager>),
    /// Manager owns the callback and resolves internally
    Managed(Arc<dyn ManagedTransactionManager>),
}
