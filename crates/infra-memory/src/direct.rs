// Direct-Protocol In-Memory Transaction Manager

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use demarc_core::domain::policy::TxPolicy;
use demarc_core::port::transaction_manager::{
    BoundaryHandle, DirectTransactionManager, ManagerError,
};

use crate::store::MemoryStore;

/// Manager the engine drives with explicit begin/commit/rollback.
///
/// One-shot failure injection per phase lets tests exercise the engine's
/// resolution-error arbitration without a real backend misbehaving.
pub struct MemoryDirectManager {
    store: Arc<MemoryStore>,
    fail_next_begin: AtomicBool,
    fail_next_commit: AtomicBool,
    fail_next_rollback: AtomicBool,
}

impl MemoryDirectManager {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            fail_next_begin: AtomicBool::new(false),
            fail_next_commit: AtomicBool::new(false),
            fail_next_rollback: AtomicBool::new(false),
        }
    }

    pub fn fail_next_begin(&self) {
        self.fail_next_begin.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_rollback(&self) {
        self.fail_next_rollback.store(true, Ordering::SeqCst);
    }
}

impl DirectTransactionManager for MemoryDirectManager {
    fn begin(&self, policy: &TxPolicy) -> Result<BoundaryHandle, ManagerError> {
        if self.fail_next_begin.swap(false, Ordering::SeqCst) {
            return Err(ManagerError::begin("injected begin failure"));
        }
        let handle = BoundaryHandle::new();
        self.store.open(handle.id());
        debug!(handle_id = %handle.id(), propagation = %policy.propagation, "memory transaction opened");
        Ok(handle)
    }

    fn commit(&self, handle: BoundaryHandle) -> Result<(), ManagerError> {
        let id = handle.id();
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            // A failed finalization still closes the boundary.
            self.store.discard(id);
            handle.mark_completed();
            return Err(ManagerError::commit("injected commit failure"));
        }
        // Resolution entry point: a rollback-only handle rolls back
        // internally while the operation itself reports success.
        if handle.is_rollback_only() {
            self.store.discard(id);
            debug!(handle_id = %id, "rollback-only honored during commit");
        } else {
            self.store.apply(id);
        }
        handle.mark_completed();
        Ok(())
    }

    fn rollback(&self, handle: BoundaryHandle) -> Result<(), ManagerError> {
        let id = handle.id();
        if self.fail_next_rollback.swap(false, Ordering::SeqCst) {
            self.store.discard(id);
            handle.mark_completed();
            return Err(ManagerError::rollback("injected rollback failure"));
        }
        self.store.discard(id);
        handle.mark_completed();
        Ok(())
    }
}
