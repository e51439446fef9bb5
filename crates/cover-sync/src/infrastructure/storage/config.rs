//! TOML-based application configuration.
//!
//! Read once at startup from `config.toml` in the platform config directory:
//! - Linux:    `~/.config/cover-sync/config.toml`
//! - macOS:    `~/Library/Application Support/CoverSync/config.toml`
//! - Windows:  `%APPDATA%\CoverSync\config.toml`
//!
//! # Resolution order
//!
//! 1. `--config-dir` on the command line.
//! 2. The `COVER_SYNC_CONFIG_DIR` environment variable.
//! 3. The first entry of [`PLATFORM_BASES`] whose variable is set.  On Linux
//!    that is `$XDG_CONFIG_HOME/cover-sync`, then `$HOME/.config/cover-sync`.
//!
//! Devices like e-readers often lack `HOME`; the explicit override is the
//! expected setup there, and a missing directory is reported rather than
//! guessed.
//!
//! # Format
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [paths]
//! writable_roots = ["/mnt/us", "/sdcard"]
//! settings_file = "/mnt/us/cover-sync/settings.toml"
//! ```
//!
//! Every field is optional; absent fields take their defaults.  The cover
//! image keys themselves live in the settings store, not here.

use std::path::{Path, PathBuf};

use cover_core::PathValidator;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::settings::SETTINGS_FILE_NAME;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "COVER_SYNC_CONFIG_DIR";
/// Application config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Why `config.toml` could not be loaded.
///
/// Every variant names the file or override involved so the binary can
/// print it without extra context.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No override was given and no platform base directory is set.
    #[error("no config directory: pass --config-dir or set {}", CONFIG_DIR_ENV)]
    NoConfigDir,

    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has fields of the wrong type.
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// File-system locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Directories the target image may be written under.  Empty means any
    /// directory whose permissions allow writing.
    #[serde(default)]
    pub writable_roots: Vec<PathBuf>,
    /// Location of the settings store; defaults to `settings.toml` in the
    /// config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Resolves the settings store location relative to `config_dir`.
    pub fn settings_path(&self, config_dir: &Path) -> PathBuf {
        match &self.paths.settings_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => config_dir.join(path),
            None => config_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Builds the target path validator for the configured roots.
    pub fn validator(&self) -> PathValidator {
        PathValidator::with_writable_roots(self.paths.writable_roots.iter().cloned())
    }
}

/// Determines the config directory: `override_dir`, then
/// [`CONFIG_DIR_ENV`], then the first platform base that is set (see
/// [`PLATFORM_BASES`]).
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when none of them is available.
pub fn config_dir(override_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = non_empty_var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    PLATFORM_BASES
        .iter()
        .find_map(|(var, rest)| non_empty_var(var).map(|base| PathBuf::from(base).join(rest)))
        .ok_or(ConfigError::NoConfigDir)
}

/// Loads `config.toml` from `dir`, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}

/// Per-user config location on Windows.
#[cfg(target_os = "windows")]
pub const PLATFORM_BASES: &[(&str, &str)] = &[("APPDATA", "CoverSync")];

/// Per-user config location on macOS.
#[cfg(target_os = "macos")]
pub const PLATFORM_BASES: &[(&str, &str)] =
    &[("HOME", "Library/Application Support/CoverSync")];

/// Per-user config locations, tried in order: the environment variable
/// holding a base directory, and the path below it.
///
/// An empty variable counts as unset, matching the XDG rules.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const PLATFORM_BASES: &[(&str, &str)] = &[
    ("XDG_CONFIG_HOME", "cover-sync"),
    ("HOME", ".config/cover-sync"),
];

fn non_empty_var(name: &str) -> Option<std::ffi::OsString> {
    std::env::var_os(name).filter(|v| !v.is_empty())
}
