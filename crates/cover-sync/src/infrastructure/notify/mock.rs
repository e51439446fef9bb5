//! Mock notifier for tests.

use std::sync::{Arc, Mutex};

use cover_core::Notice;

use crate::application::sync_cover::Notifier;

/// A [`Notifier`] that records every notice it receives.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("lock poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().expect("lock poisoned").push(notice.clone());
    }
}
