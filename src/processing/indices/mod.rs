// src/processing/indices/mod.rs
pub mod nbr;

use anyhow::Result;
use gdal::raster::Buffer;

// Re-export indices
pub use nbr::{normalized_difference, NBR};

/// Trait for spectral index calculators
pub trait IndexCalculator: Send + Sync {
    /// Calculate the index from the provided input bands
    fn calculate(&self, inputs: &[&Buffer<f32>]) -> Result<Buffer<f32>>;

    /// Return the number of required input bands
    fn required_bands(&self) -> usize;

    /// Return the name of the index
    fn name(&self) -> &str;
}
