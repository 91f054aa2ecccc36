// src/processing/mod.rs
pub mod classify;
pub mod difference;
pub mod indices;
pub mod pipeline;
pub mod summary;

use anyhow::{ensure, Result};

// Re-export main components
pub use classify::{Classifier, DNBR_BREAKPOINTS, NO_DATA_CLASS};
pub use difference::difference;
pub use pipeline::{BandSelection, DeltaRaster, SeverityOutputs, SeverityProcessor, SeverityResult};
pub use summary::ClassSummary;

/// Elementwise operations require operands of identical `(width, height)`.
pub(crate) fn check_shapes(op: &str, a: (usize, usize), b: (usize, usize)) -> Result<()> {
    ensure!(a == b, "Shape mismatch in {}: {:?} vs {:?}", op, a, b);
    Ok(())
}
