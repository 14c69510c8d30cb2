use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::{
    errors::{Result, SubscriptionError},
    utils::{ensure_dir, write_atomic, PathResolver},
};
use crate::domain::{SortField, SortOrder};

/// User preferences persisted next to the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_dir: Option<PathBuf>,
    pub default_sort: SortField,
    pub default_order: SortOrder,
    pub show_paused: bool,
    pub currency_symbol: String,
    pub upcoming_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            images_dir: None,
            default_sort: SortField::Name,
            default_order: SortOrder::Asc,
            show_paused: true,
            currency_symbol: "$".into(),
            upcoming_days: 7,
        }
    }
}

impl Config {
    /// Applies a `key value` pair from the shell.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_sort" => self.default_sort = value.parse()?,
            "default_order" => self.default_order = value.parse()?,
            "show_paused" => {
                self.show_paused = value.parse().map_err(|_| {
                    SubscriptionError::InvalidInput(format!("expected true or false, got `{value}`"))
                })?
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "upcoming_days" => {
                self.upcoming_days = value.parse().map_err(|_| {
                    SubscriptionError::InvalidInput(format!("expected a day count, got `{value}`"))
                })?
            }
            "data_file" => self.data_file = optional_path(value),
            "images_dir" => self.images_dir = optional_path(value),
            other => {
                return Err(SubscriptionError::InvalidInput(format!(
                    "unknown config key `{other}`"
                )))
            }
        }
        Ok(())
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Snapshot file honoring the `data_file` override.
    pub fn data_file(&self, config: &Config) -> PathBuf {
        config
            .data_file
            .clone()
            .unwrap_or_else(|| PathResolver::data_file_in(&self.base))
    }

    /// Image library honoring the `images_dir` override.
    pub fn images_dir(&self, config: &Config) -> PathBuf {
        config
            .images_dir
            .clone()
            .unwrap_or_else(|| PathResolver::images_dir_in(&self.base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(manager.data_file(&config), temp.path().join("subscriptions.json"));
        assert_eq!(manager.images_dir(&config), temp.path().join("images"));
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("default_sort", "cost").unwrap();
        config.set("default_order", "desc").unwrap();
        config.set("currency_symbol", "€").unwrap();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.default_sort, SortField::Cost);
        assert_eq!(loaded.default_order, SortOrder::Desc);
        assert_eq!(loaded.currency_symbol, "€");
        assert!(!manager.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "upcoming_days": 30 }"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.upcoming_days, 30);
        assert_eq!(loaded.currency_symbol, "$");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("theme", "dark"),
            Err(SubscriptionError::InvalidInput(_))
        ));
        assert!(config.set("show_paused", "maybe").is_err());
    }
}
