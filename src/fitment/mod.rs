// Fitment matching: decides whether a product fits the selected vehicle.

pub mod heuristics;
pub mod matcher;
pub mod record;
pub mod stats;
