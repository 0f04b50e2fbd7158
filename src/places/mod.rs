pub mod core;

// Re-export the main types for convenience
pub use core::{PlaceRecord, PlaceSource, Places, DEFAULT_DATASET};
