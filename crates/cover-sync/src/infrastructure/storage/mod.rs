//! Settings and configuration persistence.
//!
//! - `config`   – `config.toml`: log level, writable roots, store location.
//! - `settings` – `settings.toml`: the global `cover_image_*` keys.
//! - `document` – `<stem>.sdr/metadata.json`: per-document settings.
//! - `memory`   – a shared in-memory store for tests and embedding hosts.
//!
//! Both file-backed stores rewrite their whole file on every save and keep
//! keys they do not understand.

pub mod config;
pub mod document;
pub mod memory;
pub mod settings;
