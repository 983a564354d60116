//! Configuration module for the fear-greed pipeline.

pub mod analysis;

mod debug; // Private: files use crate::config::DEBUG_FLAGS not crate::config::debug::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

pub mod persistence;
pub mod regions;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AggregationSettings, WindowSettings};
pub use persistence::{
    PERSISTENCE, index_output_filename, summary_cache_filename, summary_output_filename,
};
pub use regions::{REGIONS, RegionDef};
