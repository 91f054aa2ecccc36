// src/io/writer.rs
use anyhow::{ensure, Context, Result};
use gdal::raster::{Buffer, GdalType, RasterCreationOptions};
use gdal::{Dataset, DriverManager, Metadata};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::reader::GeoInfo;

/// GeoTIFF creation settings shared by every raster this crate writes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WriteOptions {
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: default_compress(),
            compress_level: default_compress_level(),
            tiled: true,
        }
    }
}

impl WriteOptions {
    fn creation_options(&self, extra: &[&str]) -> RasterCreationOptions {
        let mut options = Vec::new();
        let compress = self.compress.to_uppercase();

        if compress != "NONE" {
            options.push(format!("COMPRESS={}", compress));

            match compress.as_str() {
                "DEFLATE" => options.push(format!("ZLEVEL={}", self.compress_level.min(9))),
                "ZSTD" => options.push(format!("ZSTD_LEVEL={}", self.compress_level.min(22))),
                _ => {}
            }
        }

        if self.tiled {
            options.push("TILED=YES".to_string());
        }
        options.push("NUM_THREADS=ALL_CPUS".to_string());
        options.extend(extra.iter().map(|option| option.to_string()));

        RasterCreationOptions::from_iter(options)
    }
}

/// Create a GeoTIFF carrying `geo_info`'s transform and CRS, replacing any existing file.
fn create_geotiff<T: GdalType>(
    path: &Path,
    geo_info: &GeoInfo,
    band_count: usize,
    options: &WriteOptions,
    extra: &[&str],
) -> Result<Dataset> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to replace existing {}", path.display()))?;
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = options.creation_options(extra);
    let mut dataset = driver
        .create_with_band_type_with_options::<T, _>(
            path,
            geo_info.width,
            geo_info.height,
            band_count,
            &creation_options,
        )
        .with_context(|| format!("Failed to create {}", path.display()))?;

    dataset.set_projection(&geo_info.projection)?;
    dataset.set_geo_transform(&geo_info.geo_transform)?;
    Ok(dataset)
}

/// Write a class grid as a single-band `u8` GeoTIFF.
pub fn write_classes(
    classes: &Buffer<u8>,
    geo_info: &GeoInfo,
    output_path: &Path,
    options: &WriteOptions,
) -> Result<()> {
    ensure!(
        classes.shape() == geo_info.shape(),
        "Class grid shape {:?} does not match raster grid {:?}",
        classes.shape(),
        geo_info.shape()
    );

    let mut out_ds = create_geotiff::<u8>(output_path, geo_info, 1, options, &[])?;
    let mut band = out_ds.rasterband(1)?;
    band.set_description("dNBR severity class")?;

    let mut buffer = Buffer::new(geo_info.shape(), classes.data().to_vec());
    band.write((0, 0), geo_info.shape(), &mut buffer)?;
    out_ds.flush_cache()?;

    info!("Wrote severity classes to {}", output_path.display());
    Ok(())
}

/// Write a continuous index grid as a single-band `f32` GeoTIFF with `NaN` as no-data.
pub fn write_index(
    index: &Buffer<f32>,
    geo_info: &GeoInfo,
    output_path: &Path,
    description: &str,
    options: &WriteOptions,
) -> Result<()> {
    ensure!(
        index.shape() == geo_info.shape(),
        "{} grid shape {:?} does not match raster grid {:?}",
        description,
        index.shape(),
        geo_info.shape()
    );

    let mut out_ds = create_geotiff::<f32>(output_path, geo_info, 1, options, &[])?;
    let mut band = out_ds.rasterband(1)?;
    band.set_no_data_value(Some(f64::NAN))?;
    band.set_description(description)?;

    let mut buffer = Buffer::new(geo_info.shape(), index.data().to_vec());
    band.write((0, 0), geo_info.shape(), &mut buffer)?;
    out_ds.flush_cache()?;

    info!("Wrote {} to {}", description, output_path.display());
    Ok(())
}

/// Write pixel-interleaved RGBA bytes as a 4-band `u8` GeoTIFF with an alpha band.
pub fn write_rgba(
    rgba: &[u8],
    geo_info: &GeoInfo,
    output_path: &Path,
    options: &WriteOptions,
) -> Result<()> {
    let pixels = geo_info.width * geo_info.height;
    ensure!(
        rgba.len() == pixels * 4,
        "RGBA buffer holds {} bytes, expected {}",
        rgba.len(),
        pixels * 4
    );

    let mut out_ds =
        create_geotiff::<u8>(output_path, geo_info, 4, options, &["PHOTOMETRIC=RGB", "ALPHA=YES"])?;

    for channel in 0..4 {
        let plane: Vec<u8> = rgba.iter().skip(channel).step_by(4).copied().collect();
        let mut band = out_ds.rasterband(channel + 1)?;
        let mut buffer = Buffer::new(geo_info.shape(), plane);
        band.write((0, 0), geo_info.shape(), &mut buffer)?;
    }
    out_ds.flush_cache()?;

    info!("Wrote RGBA preview to {}", output_path.display());
    Ok(())
}
