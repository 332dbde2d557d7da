use anyhow::{anyhow, Result};
use parking_lot::Mutex;

use super::traits::SelectionStore;
use crate::cascade::selection::VehicleSelection;

/// In-process store holding the serialized record, as the file store would.
#[derive(Default)]
pub struct MemoryStore {
    raw: Mutex<Option<String>>,
    writes: Mutex<u64>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: &VehicleSelection) -> Self {
        Self {
            raw: Mutex::new(Some(selection.to_json())),
            ..Self::default()
        }
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Replace the stored text verbatim (used to simulate corrupt records).
    pub fn set_raw(&self, raw: &str) {
        *self.raw.lock() = Some(raw.to_string());
    }

    pub fn write_count(&self) -> u64 {
        *self.writes.lock()
    }
}

impl SelectionStore for MemoryStore {
    fn read(&self) -> Result<VehicleSelection> {
        match self.raw.lock().as_deref() {
            Some(raw) => Ok(serde_json::from_str::<VehicleSelection>(raw)?.normalized()),
            None => Ok(VehicleSelection::default()),
        }
    }

    fn write(&self, selection: &VehicleSelection) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("memory store is read-only"));
        }
        *self.raw.lock() = Some(selection.to_json());
        *self.writes.lock() += 1;
        Ok(())
    }
}
