// Debounced quick-filter channel: category and free-text search layered on
// top of the vehicle selection.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl QuickFilter {
    pub fn new(category_id: Option<&str>, search_term: Option<&str>) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            category_id: clean(category_id),
            search_term: clean(search_term),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.search_term.is_none()
    }
}

/// Publishes the latest quick filter after `delay` of quiet. A newer value
/// cancels the pending one; an empty filter is never emitted.
///
/// `set` spawns onto the current tokio runtime.
pub struct QuickFilterPublisher {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
    tx: mpsc::UnboundedSender<QuickFilter>,
}

impl QuickFilterPublisher {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<QuickFilter>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let publisher = Self {
            delay,
            pending: Mutex::new(None),
            tx,
        };
        (publisher, rx)
    }

    pub fn set(&self, filter: QuickFilter) {
        let filter = QuickFilter::new(filter.category_id.as_deref(), filter.search_term.as_deref());

        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock();
            if let Some(previous) = pending.take() {
                previous.cancel();
            }
            if filter.is_empty() {
                debug!("empty quick filter suppressed");
                return;
            }
            *pending = Some(token.clone());
        }

        let tx = self.tx.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    debug!("quick filter emitted {:?}", filter);
                    let _ = tx.send(filter);
                }
                _ = token.cancelled() => {}
            }
        });
    }
}

impl Drop for QuickFilterPublisher {
    fn drop(&mut self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }
}
