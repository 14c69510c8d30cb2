//! The directory of subscription images. Records reference images by file
//! name only; this module owns the mapping to paths.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::errors::{Result, SubscriptionError};
use crate::core::utils::{ensure_dir, write_atomic};
use crate::domain::Category;

/// Prefix of the built-in per-category icons, which never travel in bundles.
pub const DEFAULT_IMAGE_PREFIX: &str = "default_";

#[derive(Debug, Clone)]
pub struct ImageLibrary {
    dir: PathBuf,
}

impl ImageLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for `filename`, or `None` when no image is set.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        let name = file_name_only(filename)?;
        Some(self.dir.join(name))
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.path_for(filename).is_some_and(|path| path.is_file())
    }

    /// Copies `source` into the library under `filename`.
    pub fn save_from(&self, source: &Path, filename: &str) -> Result<PathBuf> {
        let data = fs::read(source)?;
        self.write_bytes(filename, &data)
    }

    /// Stores `data` under the base name of `filename`.
    pub fn write_bytes(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let name = file_name_only(filename).ok_or_else(|| {
            SubscriptionError::InvalidInput(format!("`{filename}` is not a usable image name"))
        })?;
        ensure_dir(&self.dir)?;
        let dest = self.dir.join(name);
        write_atomic(&dest, data)?;
        Ok(dest)
    }

    /// Removes `filename`; an empty name or an already missing file is fine.
    pub fn delete(&self, filename: &str) -> Result<()> {
        let Some(path) = self.path_for(filename) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

pub fn default_image_for(category: Category) -> String {
    format!("{DEFAULT_IMAGE_PREFIX}{}.png", category.as_str())
}

pub fn is_default_image(filename: &str) -> bool {
    filename.starts_with(DEFAULT_IMAGE_PREFIX)
}

/// Base name of `raw`, rejecting empty names and bare `.`/`..`.
pub(crate) fn file_name_only(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let name = trimmed.rsplit(['/', '\\']).next()?;
    match name {
        "" | "." | ".." => None,
        other => Some(other),
    }
}
