//! Mock cover source for tests and demos.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::application::cover_image::CoverImage;
use crate::application::sync_cover::{CoverSource, DocumentHandle};

/// A [`CoverSource`] serving preset covers keyed by document id.
///
/// Clones share state, so a test can keep a handle to count requests after
/// moving another clone into the manager.
#[derive(Debug, Clone, Default)]
pub struct StaticCoverSource {
    covers: Arc<HashMap<String, CoverImage>>,
    requests: Arc<Mutex<u32>>,
}

impl StaticCoverSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `cover` for the document with `id`.
    pub fn with_cover(mut self, id: &str, cover: CoverImage) -> Self {
        Arc::make_mut(&mut self.covers).insert(id.to_string(), cover);
        self
    }

    /// Number of times a cover was requested.
    pub fn requests(&self) -> u32 {
        *self.requests.lock().expect("lock poisoned")
    }
}

impl CoverSource for StaticCoverSource {
    fn cover_image(&self, document: &DocumentHandle) -> Option<CoverImage> {
        *self.requests.lock().expect("lock poisoned") += 1;
        self.covers.get(&document.id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory::MemoryStore;

    #[test]
    fn test_serves_known_ids_and_counts_requests() {
        let cover = CoverImage::from_rgba(1, 1, vec![0, 0, 0, 255]).unwrap();
        let source = StaticCoverSource::new().with_cover("a", cover);
        let observer = source.clone();

        let a = DocumentHandle::new("a", "/a.epub", Box::new(MemoryStore::new()));
        let b = DocumentHandle::new("b", "/b.epub", Box::new(MemoryStore::new()));

        assert!(source.cover_image(&a).is_some());
        assert!(source.cover_image(&b).is_none());
        assert_eq!(observer.requests(), 2);
    }
}
