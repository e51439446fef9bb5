//! Domain entities for cover image synchronisation.
//!
//! Nothing in this module writes to disk.  The only file-system access is the
//! read-only `stat`/`open` probing done by [`path`] when judging whether a
//! path can be trusted.

/// Target and fallback path validation.
pub mod path;

/// User-facing warnings.
pub mod notice;

/// Open/close decisions for the target file.
pub mod policy;

/// Configuration keys, defaults and the settings store abstraction.
pub mod settings;
