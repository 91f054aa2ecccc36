// src/processing/difference.rs
use anyhow::Result;
use gdal::raster::Buffer;
use rayon::prelude::*;

use super::check_shapes;

/// `pre - post` per pixel.
///
/// `NaN` in either operand propagates to the result through plain IEEE-754
/// arithmetic.
pub fn difference(pre: &Buffer<f32>, post: &Buffer<f32>) -> Result<Buffer<f32>> {
    check_shapes("difference", pre.shape(), post.shape())?;

    let result_data: Vec<f32> = pre
        .data()
        .par_iter()
        .zip(post.data().par_iter())
        .map(|(&before, &after)| before - after)
        .collect();

    Ok(Buffer::new(pre.shape(), result_data))
}
