// src/processing/indices/nbr.rs
use anyhow::{ensure, Result};
use gdal::raster::Buffer;
use rayon::prelude::*;

use super::IndexCalculator;
use crate::processing::check_shapes;

/// `(A - B) / (A + B)` per pixel.
///
/// A zero denominator gives an infinite ratio, which is stored as `NaN` (the
/// missing-value marker) instead. `0 / 0` is already `NaN`. Missing inputs stay
/// missing.
pub fn normalized_difference(band_a: &Buffer<f32>, band_b: &Buffer<f32>) -> Result<Buffer<f32>> {
    check_shapes("normalized difference", band_a.shape(), band_b.shape())?;

    let shape = band_a.shape();
    let a_data = band_a.data();
    let b_data = band_b.data();

    let mut result_data = vec![0.0f32; a_data.len()];
    result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
        let a_val = a_data[i];
        let b_val = b_data[i];

        let ratio = (a_val - b_val) / (a_val + b_val);
        *result = if ratio.is_infinite() { f32::NAN } else { ratio };
    });

    Ok(Buffer::new(shape, result_data))
}

/// Normalized Burn Ratio (NBR) calculator: `(NIR - SWIR) / (NIR + SWIR)`
pub struct NBR {
    nir_index: usize,
    swir_index: usize,
    name: String,
}

impl NBR {
    pub fn new(nir_index: usize, swir_index: usize, name: Option<String>) -> Self {
        Self {
            nir_index,
            swir_index,
            name: name.unwrap_or_else(|| "NBR".to_string()),
        }
    }
}

impl IndexCalculator for NBR {
    fn calculate(&self, inputs: &[&Buffer<f32>]) -> Result<Buffer<f32>> {
        ensure!(
            self.nir_index < inputs.len() && self.swir_index < inputs.len(),
            "{} needs inputs {} (NIR) and {} (SWIR), got {} bands",
            self.name,
            self.nir_index,
            self.swir_index,
            inputs.len()
        );

        normalized_difference(inputs[self.nir_index], inputs[self.swir_index])
    }

    fn required_bands(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        &self.name
    }
}
