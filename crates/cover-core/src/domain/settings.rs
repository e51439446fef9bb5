//! Persisted configuration for cover image synchronisation.
//!
//! Settings live in a flat key/value store.  The global store holds the four
//! `cover_image_*` keys; each document carries its own store holding
//! [`KEY_EXCLUDE`].  Absent keys fall back to the documented defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target image path (string).
pub const KEY_TARGET_PATH: &str = "cover_image_path";
/// Fallback image path (string, empty means "delete instead").
pub const KEY_FALLBACK_PATH: &str = "cover_image_fallback_path";
/// Master switch (bool).
pub const KEY_ENABLED: &str = "cover_image_enabled";
/// Fallback substitution on close (bool).
pub const KEY_FALLBACK_ENABLED: &str = "cover_image_fallback";
/// Per-document exclusion flag (bool), stored in the document's own settings.
pub const KEY_EXCLUDE: &str = "exclude_cover_image";

pub const DEFAULT_TARGET_PATH: &str = "cover.png";
pub const DEFAULT_FALLBACK_PATH: &str = "cover_fallback.png";

/// A single stored setting value.
///
/// Untagged so that stores serialise plain booleans and strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            SettingValue::Bool(_) => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

/// Error type for settings persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be parsed or serialised.
    #[error("settings format error: {0}")]
    Format(String),
}

/// Key/value settings persistence.
///
/// Implemented by the global configuration store and by each document's
/// settings sidecar.
pub trait SettingsStore {
    /// Returns the stored value, or `None` when the key is absent.
    fn read_setting(&self, key: &str) -> Option<SettingValue>;

    /// Stores `value` under `key` and persists it immediately.
    fn save_setting(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError>;

    /// Returns `true` only when the key holds the boolean `true`.
    fn is_true(&self, key: &str) -> bool {
        matches!(self.read_setting(key), Some(SettingValue::Bool(true)))
    }

    /// Returns the string stored under `key`, or `default` when absent or not
    /// a string.
    fn read_string(&self, key: &str, default: &str) -> String {
        self.read_setting(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }
}

/// In-memory snapshot of the global cover image configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverConfig {
    /// Master switch.  When off, covers are never written or copied.
    pub enabled: bool,
    /// Whether the fallback substitution runs on document close.
    pub fallback_enabled: bool,
    /// Where the screensaver image is written.
    pub target_path: String,
    /// Substitute image; empty means "delete the target instead".
    pub fallback_path: String,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fallback_enabled: false,
            target_path: DEFAULT_TARGET_PATH.to_string(),
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
        }
    }
}

impl CoverConfig {
    /// Reads the configuration from `store`, applying defaults for absent keys.
    pub fn load(store: &dyn SettingsStore) -> Self {
        Self {
            enabled: store.is_true(KEY_ENABLED),
            fallback_enabled: store.is_true(KEY_FALLBACK_ENABLED),
            target_path: store.read_string(KEY_TARGET_PATH, DEFAULT_TARGET_PATH),
            fallback_path: store.read_string(KEY_FALLBACK_PATH, DEFAULT_FALLBACK_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore(HashMap<String, SettingValue>);

    impl SettingsStore for MapStore {
        fn read_setting(&self, key: &str) -> Option<SettingValue> {
            self.0.get(key).cloned()
        }

        fn save_setting(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
            self.0.insert(key.to_string(), value);
            Ok(())
        }
    }

    #[test]
    fn test_load_from_empty_store_uses_documented_defaults() {
        let cfg = CoverConfig::load(&MapStore::default());

        assert_eq!(cfg, CoverConfig::default());
        assert!(!cfg.enabled);
        assert!(!cfg.fallback_enabled);
        assert_eq!(cfg.target_path, "cover.png");
        assert_eq!(cfg.fallback_path, "cover_fallback.png");
    }

    #[test]
    fn test_load_reads_every_key() {
        let mut store = MapStore::default();
        store.save_setting(KEY_ENABLED, true.into()).unwrap();
        store.save_setting(KEY_FALLBACK_ENABLED, true.into()).unwrap();
        store.save_setting(KEY_TARGET_PATH, "/sdcard/cover.png".into()).unwrap();
        store.save_setting(KEY_FALLBACK_PATH, "".into()).unwrap();

        let cfg = CoverConfig::load(&store);

        assert!(cfg.enabled);
        assert!(cfg.fallback_enabled);
        assert_eq!(cfg.target_path, "/sdcard/cover.png");
        assert_eq!(cfg.fallback_path, "", "an explicit empty fallback must not revert to the default");
    }

    #[test]
    fn test_is_true_ignores_non_boolean_values() {
        let mut store = MapStore::default();
        store.save_setting(KEY_ENABLED, "true".into()).unwrap();
        assert!(!store.is_true(KEY_ENABLED));
    }

    #[test]
    fn test_setting_value_accessors() {
        let flag: SettingValue = true.into();
        let text: SettingValue = "cover.png".into();

        assert_eq!(flag.as_bool(), Some(true));
        assert_eq!(flag.as_str(), None);
        assert_eq!(text.as_str(), Some("cover.png"));
        assert_eq!(text.as_bool(), None);
    }
}
