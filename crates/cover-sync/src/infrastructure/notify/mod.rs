//! Notice delivery.
//!
//! The binary has no widgets, so [`TracingNotifier`] routes notices to the
//! log at `warn` level, where the console subscriber prints them.

use cover_core::Notice;
use tracing::warn;

use crate::application::sync_cover::Notifier;

pub mod mock;

/// Logs each notice as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        let timeout_secs = notice.timeout().map(|t| t.as_secs());
        warn!(?timeout_secs, "{}", notice.message().replace('\n', " "));
    }
}
