//! TOML inventory configuration.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slotinv_core::{InventoryError, StackSizeTable, DEFAULT_MAX_STACK_SIZE};
use tracing::warn;

/// Default location of the inventory config.
pub const DEFAULT_CONFIG_PATH: &str = "config/inventory.toml";

/// Capacity and stack size catalog of an inventory.
///
/// ```toml
/// capacity = 27
/// default_max_stack_size = 64
///
/// [stack_sizes]
/// sword = 1
/// ender_pearl = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Number of slots.
    pub capacity: usize,
    /// Stack size for items without an entry in `stack_sizes`.
    pub default_max_stack_size: u32,
    /// Per-item stack sizes.
    pub stack_sizes: BTreeMap<String, u32>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            capacity: 36,
            default_max_stack_size: DEFAULT_MAX_STACK_SIZE,
            stack_sizes: BTreeMap::new(),
        }
    }
}

impl InventoryConfig {
    /// Load from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err:#}. Using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Inventory config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                Self::default()
            }
        }
    }

    /// Load from an explicit path, failing on any error.
    pub fn load_strict(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.stack_size_table()?;
        Ok(cfg)
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Build the stack size catalog, rejecting zero sizes.
    pub fn stack_size_table(&self) -> Result<StackSizeTable, InventoryError> {
        let mut table = StackSizeTable::new(self.default_max_stack_size)?;
        for (item, size) in &self.stack_sizes {
            table.set(item.as_str(), *size)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotinv_core::{ItemId, StackSizeProvider};

    #[test]
    fn missing_fields_use_defaults() {
        let cfg = InventoryConfig::from_toml_str("capacity = 9").expect("valid config");
        assert_eq!(cfg.capacity, 9);
        assert_eq!(cfg.default_max_stack_size, DEFAULT_MAX_STACK_SIZE);
        assert!(cfg.stack_sizes.is_empty());
    }

    #[test]
    fn zero_stack_size_is_rejected() {
        let err = InventoryConfig::from_toml_str("[stack_sizes]\nsword = 0").unwrap_err();
        assert!(
            err.to_string().contains("sword"),
            "unexpected error: {err:#}"
        );
        assert!(InventoryConfig::from_toml_str("default_max_stack_size = 0").is_err());
    }

    #[test]
    fn stack_size_table_applies_overrides() {
        let cfg = InventoryConfig::from_toml_str(
            "default_max_stack_size = 64\n[stack_sizes]\nsword = 1\n",
        )
        .expect("valid config");
        let table = cfg.stack_size_table().expect("valid sizes");
        assert_eq!(table.max_stack_size(&ItemId::new("sword")).get(), 1);
        assert_eq!(table.max_stack_size(&ItemId::new("wood")).get(), 64);
    }

    #[test]
    fn save_then_strict_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("inventory.toml");
        let mut cfg = InventoryConfig::default();
        cfg.capacity = 27;
        cfg.stack_sizes.insert("pearl".into(), 16);

        cfg.save_to_path(&path).expect("save");
        assert_eq!(InventoryConfig::load_strict(&path).expect("load"), cfg);
    }

    #[test]
    fn lenient_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "capacity = \"many\"").expect("write");

        assert_eq!(InventoryConfig::load_from_path(&path), InventoryConfig::default());
        assert!(InventoryConfig::load_strict(&path).is_err());
        assert_eq!(
            InventoryConfig::load_from_path(&dir.path().join("missing.toml")),
            InventoryConfig::default()
        );
    }
}
