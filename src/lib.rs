//! Vehicle fitment resolution for a replacement-parts storefront.
//!
//! - [`cascade`]: the brand → model → engine selection controller.
//! - [`fitment`]: the product/vehicle compatibility predicate.
//! - [`catalog`] and [`store`]: the upstream catalog and persistence boundaries.

pub mod api;
pub mod cascade;
pub mod catalog;
pub mod config;
pub mod fitment;
pub mod server;
pub mod store;

pub use cascade::controller::SelectionController;
pub use cascade::selection::VehicleSelection;
pub use fitment::matcher::{matches, FitmentMatcher};
