use std::cell::Cell;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use tracing::debug;

use super::selection::VehicleSelection;

pub type SelectionObserver = Arc<dyn Fn(&VehicleSelection) + Send + Sync>;

#[derive(Default)]
struct Published {
    json: Option<String>,
    seq: u64,
}

/// Fans selection changes out to observers, skipping any emission whose
/// serialized form equals the last one delivered.
///
/// Emissions are numbered when prepared and delivered one at a time in that
/// order; an emission overtaken by a newer one is dropped. An observer may
/// call back into the controller from its own thread.
#[derive(Default)]
pub struct SelectionPublisher {
    observers: Mutex<Vec<SelectionObserver>>,
    last_published: Mutex<Published>,
    delivered: Arc<ReentrantMutex<Cell<u64>>>,
}

/// A decided emission; delivered after the caller releases its own locks so
/// observers may read controller state.
pub struct Emission {
    seq: u64,
    selection: VehicleSelection,
    observers: Vec<SelectionObserver>,
    delivered: Arc<ReentrantMutex<Cell<u64>>>,
}

impl Emission {
    pub fn deliver(self) {
        let delivered = self.delivered.lock();
        if self.seq <= delivered.get() {
            debug!("superseded emission dropped seq={}", self.seq);
            return;
        }
        delivered.set(self.seq);
        for observer in &self.observers {
            observer(&self.selection);
        }
    }
}

impl SelectionPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: SelectionObserver) {
        self.observers.lock().push(observer);
    }

    /// Record `selection` as published unless it equals the previous emission.
    /// Callers prepare under the lock that orders their state changes.
    pub fn prepare(&self, selection: &VehicleSelection) -> Option<Emission> {
        let serialized = selection.to_json();
        let seq = {
            let mut last = self.last_published.lock();
            if last.json.as_deref() == Some(serialized.as_str()) {
                debug!("selection unchanged, emission skipped");
                return None;
            }
            last.json = Some(serialized);
            last.seq += 1;
            last.seq
        };
        Some(Emission {
            seq,
            selection: selection.clone(),
            observers: self.observers.lock().clone(),
            delivered: self.delivered.clone(),
        })
    }
}
