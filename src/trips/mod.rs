// Trip registry - funding pools with a capture threshold
pub mod models;
pub mod registry;

pub use models::{Trip, TripPhase};
pub use registry::TripRegistry;
