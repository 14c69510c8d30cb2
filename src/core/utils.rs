use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::core::errors::Result;

const HOME_ENV: &str = "SUBSCRIPTION_CORE_HOME";
const DEFAULT_DIR_NAME: &str = "subman";
const DATA_FILE: &str = "subscriptions.json";
const IMAGES_DIR: &str = "images";
const CONFIG_FILE: &str = "config.json";

/// Resolves the on-disk layout of the application directory.
pub struct PathResolver;

impl PathResolver {
    /// Application directory: `$SUBSCRIPTION_CORE_HOME`, else `<config dir>/subman`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn data_file_in(base: &Path) -> PathBuf {
        base.join(DATA_FILE)
    }

    pub fn images_dir_in(base: &Path) -> PathBuf {
        base.join(IMAGES_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Stages `data` next to `path` and renames it into place.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_replaces_existing_file() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("nested").join("data.json");
        write_atomic(&path, b"first").expect("first write");
        write_atomic(&path, b"second").expect("second write");
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn layout_hangs_off_base() {
        let base = PathBuf::from("/tmp/subman-test");
        assert_eq!(PathResolver::data_file_in(&base), base.join("subscriptions.json"));
        assert_eq!(PathResolver::images_dir_in(&base), base.join("images"));
        assert_eq!(PathResolver::config_file_in(&base), base.join("config.json"));
    }
}
