use std::sync::{
    atomic::{AtomicUsize, Ordering},
    RwLock,
};

use crate::{core::errors::SubscriptionError, domain::Snapshot};

use super::{Result, SnapshotStore};

/// In-process store used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Snapshot>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        self.inner
            .read()
            .map(|snapshot| snapshot.clone())
            .map_err(|_| SubscriptionError::StorageFailure("store lock poisoned".into()))
    }

    fn save(&self, snapshot: &mut Snapshot) -> Result<()> {
        snapshot.stamp_version();
        let mut guard = self
            .inner
            .write()
            .map_err(|_| SubscriptionError::StorageFailure("store lock poisoned".into()))?;
        *guard = snapshot.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
