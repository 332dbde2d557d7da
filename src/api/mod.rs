// Application-facing entry points.

pub mod fitment_api;
pub mod simple;
