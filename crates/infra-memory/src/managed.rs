// Callback-Preferring In-Memory Transaction Manager

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use demarc_core::domain::policy::TxPolicy;
use demarc_core::port::transaction_manager::{
    BoundaryHandle, ManagedTransactionManager, ManagerError,
};

use crate::store::MemoryStore;

/// Manager that owns the body invocation and resolves the boundary itself
/// from the rollback-only flag the body left on the handle.
pub struct MemoryManagedManager {
    store: Arc<MemoryStore>,
    /// Systemic failure before any boundary opens; the body never runs
    fail_next_execute: AtomicBool,
    /// Internal commit failure, surfaced to the caller as an execute error
    fail_next_commit: AtomicBool,
}

impl MemoryManagedManager {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            fail_next_execute: AtomicBool::new(false),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    pub fn fail_next_execute(&self) {
        self.fail_next_execute.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

impl ManagedTransactionManager for MemoryManagedManager {
    fn execute(
        &self,
        policy: &TxPolicy,
        body: &mut dyn FnMut(&BoundaryHandle),
    ) -> Result<(), ManagerError> {
        if self.fail_next_execute.swap(false, Ordering::SeqCst) {
            return Err(ManagerError::execute("injected systemic failure"));
        }

        let handle = BoundaryHandle::new();
        let id = handle.id();
        self.store.open(id);
        debug!(handle_id = %id, propagation = %policy.propagation, "managed transaction opened");

        body(&handle);

        let result = if handle.is_rollback_only() {
            self.store.discard(id);
            debug!(handle_id = %id, "managed transaction rolled back");
            Ok(())
        } else if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            self.store.discard(id);
            Err(ManagerError::commit("injected commit failure"))
        } else {
            self.store.apply(id);
            debug!(handle_id = %id, "managed transaction committed");
            Ok(())
        };
        handle.mark_completed();
        result
    }
}
