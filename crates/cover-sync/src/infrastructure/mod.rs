//! Infrastructure layer: adapters for the ports the application consumes.
//!
//! - `storage`      – TOML settings store, JSON document sidecars, the
//!   application config file, and an in-memory store.
//! - `cover_source` – cover extraction from sidecar images.
//! - `notify`       – delivery of user-facing notices.

pub mod cover_source;
pub mod notify;
pub mod storage;
