// src/io/reader.rs
use anyhow::{bail, Context, Result};
use gdal::raster::Buffer;
use gdal::Dataset;
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Grid size and georeferencing shared by every band of a scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoInfo {
    pub projection: String,
    pub geo_transform: [f64; 6],
    pub width: usize,
    pub height: usize,
}

impl GeoInfo {
    /// Grid shape as `(width, height)`, the order used for every `Buffer` in this crate.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Ground area covered by one pixel, in squared CRS units.
    pub fn pixel_area(&self) -> f64 {
        let gt = &self.geo_transform;
        (gt[1] * gt[5] - gt[2] * gt[4]).abs()
    }

    /// True when both grids have the same transform and CRS, not only the same size.
    pub fn same_georeference(&self, other: &GeoInfo) -> bool {
        self.shape() == other.shape()
            && self.geo_transform == other.geo_transform
            && self.projection == other.projection
    }
}

/// A single-date multiband raster, fully read into memory.
///
/// Samples equal to a band's declared no-data value are stored as `NaN`, so
/// they travel through every later stage as missing pixels.
pub struct Scene {
    pub path: PathBuf,
    pub geo_info: GeoInfo,
    bands: Vec<Buffer<f32>>,
}

impl Scene {
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band by its 1-based GDAL index.
    pub fn band(&self, index: usize) -> Result<&Buffer<f32>> {
        if index == 0 || index > self.bands.len() {
            bail!(
                "Band {} out of range for {} ({} bands available)",
                index,
                self.path.display(),
                self.bands.len()
            );
        }
        Ok(&self.bands[index - 1])
    }

    /// Consume the scene, keeping only the first band and the grid metadata.
    pub fn into_first_band(mut self) -> Result<(Buffer<f32>, GeoInfo)> {
        if self.bands.is_empty() {
            bail!("{} has no raster bands", self.path.display());
        }
        Ok((self.bands.swap_remove(0), self.geo_info))
    }
}

/// Open a raster, read every band as `f32`, and close the file again.
pub fn read_scene(path: &Path) -> Result<Scene> {
    let dataset = Dataset::open(path)
        .with_context(|| format!("Failed to open raster {}", path.display()))?;
    let (width, height) = dataset.raster_size();
    let projection = dataset.projection();
    let geo_transform = dataset.geo_transform()?;

    let mut bands = Vec::new();

    for index in 1..=dataset.raster_count() {
        let band = dataset.rasterband(index)?;
        let nodata_value = band.no_data_value();
        let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

        let mut data = buffer.data().to_vec();
        let masked = match nodata_value {
            Some(value) => mask_no_data(&mut data, value),
            None => 0,
        };
        debug!(
            "{} band {}: no-data {:?}, {} pixels masked",
            path.display(),
            index,
            nodata_value,
            masked
        );

        bands.push(Buffer::new((width, height), data));
    }

    info!(
        "Loaded {} ({}x{}, {} bands)",
        path.display(),
        width,
        height,
        bands.len()
    );

    Ok(Scene {
        path: path.to_path_buf(),
        geo_info: GeoInfo {
            projection,
            geo_transform,
            width,
            height,
        },
        bands,
    })
}

/// Replace every sample equal to `nodata` with `NaN`, returning how many were replaced.
///
/// A no-data value outside the `f32` range matches both the infinity it rounds
/// to and the `f32` limit of the same sign; GDAL's conversion may produce either.
pub fn mask_no_data(data: &mut [f32], nodata: f64) -> usize {
    if nodata.is_nan() {
        return 0;
    }
    let target = nodata as f32;
    let clamped = (nodata.abs() > f32::MAX as f64).then(|| f32::MAX.copysign(target));

    let mut masked = 0;
    for value in data
        .iter_mut()
        .filter(|value| **value == target || Some(**value) == clamped)
    {
        *value = f32::NAN;
        masked += 1;
    }
    masked
}
