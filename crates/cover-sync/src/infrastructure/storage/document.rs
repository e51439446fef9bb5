//! Per-document settings sidecars.
//!
//! Every document gets a sidecar directory next to it, named after the
//! document's stem: `books/moby.epub` keeps its settings in
//! `books/moby.sdr/metadata.json`.  The same directory is where cover images
//! are looked up (see `infrastructure::cover_source`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cover_core::{SettingValue, SettingsStore, StoreError};
use serde_json::{Map, Value};
use tracing::debug;

/// Extension of the sidecar directory.
pub const SIDECAR_EXTENSION: &str = "sdr";
/// Settings file inside the sidecar directory.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Returns the sidecar directory for `document`.
pub fn sidecar_dir(document: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = document.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{stem}.{SIDECAR_EXTENSION}"))
}

/// A document's settings, persisted as a JSON object.
#[derive(Debug)]
pub struct JsonDocumentSettings {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonDocumentSettings {
    /// Opens the sidecar settings of `document`.
    ///
    /// # Errors
    ///
    /// See [`JsonDocumentSettings::open`].
    pub fn for_document(document: &Path) -> Result<Self, StoreError> {
        Self::open(sidecar_dir(document).join(METADATA_FILE_NAME))
    }

    /// Opens the settings file at `path`; a missing file is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for read failures other than "not found"
    /// and [`StoreError::Format`] if the file is not a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<Map<String, Value>>(&content)
                .map_err(|e| StoreError::Format(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no document settings yet");
                Map::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonDocumentSettings {
    fn read_setting(&self, key: &str) -> Option<SettingValue> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    fn save_setting(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        let value = serde_json::to_value(&value).map_err(|e| StoreError::Format(e.to_string()))?;
        self.values.insert(key.to_string(), value);

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| StoreError::Format(e.to_string()))?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
