// JSON file store: one file named after the fixed storage key.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::traits::SelectionStore;
use crate::cascade::selection::VehicleSelection;
use crate::config::SELECTION_STORAGE_KEY;

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", SELECTION_STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionStore for FileStore {
    fn read(&self) -> Result<VehicleSelection> {
        if !self.path.exists() {
            return Ok(VehicleSelection::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(VehicleSelection::default());
        }
        Ok(serde_json::from_str::<VehicleSelection>(&raw)?.normalized())
    }

    fn write(&self, selection: &VehicleSelection) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        // Write-then-rename so a reader never sees a half-written record.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, selection.to_json())?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
