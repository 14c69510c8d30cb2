use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::{
    core::{
        errors::SubscriptionError,
        utils::{write_atomic, PathResolver},
    },
    domain::Snapshot,
};

use super::{Result, SnapshotStore};

/// File-backed store holding the snapshot as pretty-printed JSON.
pub struct JsonStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Store rooted in the application directory (or `root` when given).
    pub fn in_dir(root: Option<PathBuf>) -> Self {
        let base = PathResolver::resolve_base(root);
        Self::new(PathResolver::data_file_in(&base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonStore {
    fn load(&self) -> Result<Snapshot> {
        let _guard = self
            .lock
            .read()
            .map_err(|_| SubscriptionError::StorageFailure("store lock poisoned".into()))?;
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no snapshot on disk, starting empty");
            return Ok(Snapshot::default());
        }
        let snapshot = load_snapshot_from_path(&self.path)?;
        for warning in snapshot.warnings() {
            tracing::warn!("{warning}");
        }
        Ok(snapshot)
    }

    fn save(&self, snapshot: &mut Snapshot) -> Result<()> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| SubscriptionError::StorageFailure("store lock poisoned".into()))?;
        save_snapshot_to_path(snapshot, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            subscriptions = snapshot.subscriptions.len(),
            payments = snapshot.payments.len(),
            "snapshot saved"
        );
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

pub fn save_snapshot_to_path(snapshot: &mut Snapshot, path: &Path) -> Result<()> {
    snapshot.stamp_version();
    let json = serde_json::to_string_pretty(snapshot)?;
    write_atomic(path, json.as_bytes())
}

pub fn load_snapshot_from_path(path: &Path) -> Result<Snapshot> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
