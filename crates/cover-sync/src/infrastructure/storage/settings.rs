//! TOML-backed global settings store.
//!
//! The file is a flat table:
//!
//! ```toml
//! cover_image_enabled = true
//! cover_image_fallback = false
//! cover_image_path = "/mnt/us/linkss/screensavers/cover.png"
//! cover_image_fallback_path = ""
//! ```
//!
//! Values that are neither booleans nor strings are preserved on rewrite
//! but read as absent.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cover_core::{SettingValue, SettingsStore, StoreError};
use tracing::debug;

/// Default file name inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// A [`SettingsStore`] persisted as a TOML file.
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    table: toml::Table,
}

impl TomlSettingsStore {
    /// Opens the store at `path`.  A missing file yields an empty store; the
    /// file is created on the first save.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for read failures other than "not found"
    /// and [`StoreError::Format`] if the file is not valid TOML.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = match fs::read_to_string(&path) {
            Ok(content) => content
                .parse::<toml::Table>()
                .map_err(|e| StoreError::Format(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file absent, using defaults");
                toml::Table::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content =
            toml::to_string_pretty(&self.table).map_err(|e| StoreError::Format(e.to_string()))?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsStore for TomlSettingsStore {
    fn read_setting(&self, key: &str) -> Option<SettingValue> {
        self.table
            .get(key)
            .and_then(|v| v.clone().try_into::<SettingValue>().ok())
    }

    fn save_setting(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        let value = toml::Value::try_from(&value).map_err(|e| StoreError::Format(e.to_string()))?;
        self.table.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cover_sync_settings_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = scratch_dir();
        let store = TomlSettingsStore::open(dir.join(SETTINGS_FILE_NAME)).unwrap();

        assert_eq!(store.read_setting("cover_image_path"), None);
        assert!(!store.is_true("cover_image_enabled"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_persists_and_reopens() {
        // Arrange
        let dir = scratch_dir();
        let path = dir.join("nested").join(SETTINGS_FILE_NAME);
        let mut store = TomlSettingsStore::open(&path).unwrap();
        assert_eq!(store.path(), path);

        // Act
        store.save_setting("cover_image_enabled", true.into()).unwrap();
        store
            .save_setting("cover_image_path", "/sdcard/cover.png".into())
            .unwrap();
        let reopened = TomlSettingsStore::open(&path).unwrap();

        // Assert
        assert!(reopened.is_true("cover_image_enabled"));
        assert_eq!(
            reopened.read_setting("cover_image_path"),
            Some(SettingValue::Text("/sdcard/cover.png".to_string()))
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let dir = scratch_dir();
        let path = dir.join(SETTINGS_FILE_NAME);
        fs::write(&path, "frontlight = 12\ncover_image_fallback = false\n").unwrap();

        let mut store = TomlSettingsStore::open(&path).unwrap();
        assert_eq!(store.read_setting("frontlight"), None);
        store.save_setting("cover_image_fallback", true.into()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("frontlight = 12"));
        assert!(content.contains("cover_image_fallback = true"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_invalid_toml_is_format_error() {
        let dir = scratch_dir();
        let path = dir.join(SETTINGS_FILE_NAME);
        fs::write(&path, "[[[ not valid toml").unwrap();

        let result = TomlSettingsStore::open(&path);

        assert!(matches!(result, Err(StoreError::Format(_))));
        fs::remove_dir_all(&dir).ok();
    }
}
