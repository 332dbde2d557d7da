// Vehicle catalog boundary: brand/model/engine listings from the upstream catalog service.

pub mod adapter;
pub mod decode;
pub mod error;
pub mod http_catalog;
pub mod manufacturer_cache;
pub mod traits;
