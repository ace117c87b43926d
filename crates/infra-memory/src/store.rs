// In-Memory Staged-Write Store

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

/// Key-value store with per-boundary staging.
///
/// Writes performed while a boundary is open land in a staging buffer tied
/// to that boundary and only reach the committed map when the manager
/// applies them. The "current" boundary plays the role of a thread-bound
/// transaction context: callables write through the store without ever
/// seeing the handle.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    committed: HashMap<String, String>,
    staged: HashMap<Uuid, HashMap<String, String>>,
    current: Option<Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value. Staged if a boundary is open, committed directly
    /// otherwise (auto-commit).
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        let (key, value) = (key.into(), value.into());
        match inner.current {
            Some(tx) => {
                inner.staged.entry(tx).or_default().insert(key, value);
            }
            None => {
                inner.committed.insert(key, value);
            }
        }
    }

    /// Read a value: staged writes of the open boundary shadow committed
    /// state (read-your-writes), everything else sees committed state only.
    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        if let Some(tx) = inner.current {
            if let Some(value) = inner.staged.get(&tx).and_then(|buf| buf.get(key)) {
                return Some(value.clone());
            }
        }
        inner.committed.get(key).cloned()
    }

    /// Whether a key is visible in committed state
    pub fn committed_contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().committed.contains_key(key)
    }

    pub fn committed_len(&self) -> usize {
        self.inner.lock().unwrap().committed.len()
    }

    /// Open a staging buffer for a boundary and make it current.
    /// Nested boundaries are not supported; the newest one wins.
    pub(crate) fn open(&self, tx: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        inner.staged.insert(tx, HashMap::new());
        inner.current = Some(tx);
        debug!(%tx, "staging buffer opened");
    }

    /// Merge the boundary's staged writes into committed state
    pub(crate) fn apply(&self, tx: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(buf) = inner.staged.remove(&tx) {
            inner.committed.extend(buf);
        }
        if inner.current == Some(tx) {
            inner.current = None;
        }
        debug!(%tx, "staged writes applied");
    }

    /// Drop the boundary's staged writes
    pub(crate) fn discard(&self, tx: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        inner.staged.remove(&tx);
        if inner.current == Some(tx) {
            inner.current = None;
        }
        debug!(%tx, "staged writes discarded");
    }
}
