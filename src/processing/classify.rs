// src/processing/classify.rs
use gdal::raster::Buffer;
use rayon::prelude::*;

/// Interior dNBR breakpoints. With `-inf` and `+inf` on either side they
/// delimit the 8 half-open intervals `[b_i, b_{i+1})` coded 0 through 7.
pub const DNBR_BREAKPOINTS: [f32; 7] = [-0.251, -0.100, 0.100, 0.270, 0.440, 0.660, 2.000];

/// Class code for pixels whose delta is missing.
pub const NO_DATA_CLASS: u8 = 8;

/// Buckets dNBR values into the severity codes 0-7, with 8 for missing pixels.
///
/// Breakpoints are held as `f32`, the precision of the delta grid, so a value
/// equal to a breakpoint literal compares equal and goes to the upper bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    breakpoints: &'static [f32],
}

impl Classifier {
    /// The fixed dNBR severity scheme: codes 0-7 plus 8 for missing pixels.
    pub fn dnbr() -> Self {
        Self {
            breakpoints: &DNBR_BREAKPOINTS,
        }
    }

    pub fn breakpoints(&self) -> &[f32] {
        self.breakpoints
    }

    /// Code assigned to missing pixels, one past the last ordinal class.
    pub fn no_data_class(&self) -> u8 {
        self.breakpoints.len() as u8 + 1
    }

    /// Number of distinct codes, the no-data code included.
    pub fn class_count(&self) -> usize {
        self.breakpoints.len() + 2
    }

    /// Digitize one value, then override non-finite input with the no-data code.
    pub fn classify_value(&self, value: f32) -> u8 {
        let code = self.breakpoints.partition_point(|&bound| bound <= value) as u8;
        if value.is_finite() {
            code
        } else {
            self.no_data_class()
        }
    }

    pub fn classify(&self, delta: &Buffer<f32>) -> Buffer<u8> {
        let codes: Vec<u8> = delta
            .data()
            .par_iter()
            .map(|&value| self.classify_value(value))
            .collect();

        Buffer::new(delta.shape(), codes)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::dnbr()
    }
}
