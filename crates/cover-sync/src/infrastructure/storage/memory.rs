//! In-memory settings store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cover_core::{SettingValue, SettingsStore, StoreError};

/// A [`SettingsStore`] kept in memory.
///
/// Clones share the same map, so a test can keep one handle and hand another
/// to the manager, then inspect what was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, SettingValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.values
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), value.into());
        self
    }

    /// Returns the stored value for `key`.
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.lock().expect("lock poisoned").get(key).cloned()
    }
}

impl SettingsStore for MemoryStore {
    fn read_setting(&self, key: &str) -> Option<SettingValue> {
        self.get(key)
    }

    fn save_setting(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        self.values
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_values() {
        let observer = MemoryStore::new();
        let mut writer = observer.clone();

        writer.save_setting("cover_image_enabled", true.into()).unwrap();

        assert_eq!(observer.get("cover_image_enabled"), Some(SettingValue::Bool(true)));
        assert!(observer.is_true("cover_image_enabled"));
    }

    #[test]
    fn test_with_builder_inserts() {
        let store = MemoryStore::new().with("cover_image_path", "/sdcard/cover.png");
        assert_eq!(store.read_string("cover_image_path", "cover.png"), "/sdcard/cover.png");
    }
}
