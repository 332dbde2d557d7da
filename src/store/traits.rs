use anyhow::Result;

use crate::cascade::selection::VehicleSelection;

/// Key/value persistence for one serialized `VehicleSelection`.
///
/// Implementations may fail; the cascade controller treats a failed read as
/// an empty selection and ignores failed writes.
pub trait SelectionStore: Send + Sync {
    fn read(&self) -> Result<VehicleSelection>;
    fn write(&self, selection: &VehicleSelection) -> Result<()>;
}
