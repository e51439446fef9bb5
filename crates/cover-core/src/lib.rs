//! # cover-core
//!
//! Domain rules for keeping a single on-disk "screensaver image" in sync with
//! the cover of whichever document a reading application has open.
//!
//! This crate holds everything that can be decided without touching the
//! target file:
//!
//! - **`domain::path`** – validation of candidate target paths (writable
//!   location, parent exists, filename present, not a directory) and the
//!   readable-file check applied to fallback images.
//! - **`domain::settings`** – the persisted configuration keys, their
//!   defaults, and the [`SettingsStore`] abstraction both the global
//!   configuration and the per-document settings are read through.
//! - **`domain::policy`** – what a document open or close should do to the
//!   target file, given the current configuration.
//! - **`domain::notice`** – user-facing warnings and their literal text.
//!
//! File writes, copies and deletes live in the `cover-sync` crate.

pub mod domain;

pub use domain::notice::{Notice, FALLBACK_NOTICE_TIMEOUT};
pub use domain::path::{is_readable_file, PathError, PathValidator};
pub use domain::policy::{decide_close, decide_open, CloseDecision, CoverAction, OpenDecision};
pub use domain::settings::{CoverConfig, SettingValue, SettingsStore, StoreError};
