// Selection store: best-effort persistence of the single vehicle selection record.

pub mod file_store;
pub mod memory_store;
pub mod traits;
