pub mod json_backend;
pub mod memory;

use std::path::Path;

use crate::{core::errors::SubscriptionError, domain::Snapshot};

pub type Result<T> = std::result::Result<T, SubscriptionError>;

/// Whole-snapshot persistence. Implementations serialize concurrent calls so a
/// load never observes a torn snapshot and saves do not interleave.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Snapshot>;

    /// Persists `snapshot`, stamping it with the current format version.
    fn save(&self, snapshot: &mut Snapshot) -> Result<()>;

    /// Backing file, when there is one.
    fn location(&self) -> Option<&Path> {
        None
    }
}

pub use json_backend::{load_snapshot_from_path, save_snapshot_to_path, JsonStore};
pub use memory::MemoryStore;
