//! Application layer: the cover image synchronisation use case.
//!
//! - **`sync_cover`** – [`sync_cover::CoverImageManager`], which reacts to
//!   document open/close and configuration changes by writing, copying or
//!   deleting the target image.  It depends on the [`sync_cover::CoverSource`]
//!   and [`sync_cover::Notifier`] ports and on `cover_core::SettingsStore`;
//!   concrete implementations are injected at construction.
//! - **`cover_image`** – rendered cover pixels and their PNG encoding.
//! - **`target_file`** – the write/copy/remove primitives on the target path.
//!   Writes and copies land in a temporary sibling first and are renamed
//!   into place, so readers never observe a half-written image.

pub mod cover_image;
pub mod sync_cover;
pub mod target_file;
