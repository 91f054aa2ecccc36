// src/processing/pipeline.rs
use anyhow::{ensure, Result};
use gdal::raster::Buffer;
use itertools::{Itertools, MinMaxResult};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::classify::Classifier;
use super::difference::difference;
use super::indices::{IndexCalculator, NBR};
use super::summary::ClassSummary;
use crate::io::{read_scene, write_classes, write_index, write_rgba, GeoInfo, Scene, WriteOptions};
use crate::render::{
    render_classes, render_continuous, ColorRamp, DisplayRange, Legend, MapDocument, MapView,
    SEVERITY_PALETTE,
};

/// Percentiles used to stretch the continuous dNBR layer for display.
pub const STRETCH_PERCENTILES: (f64, f64) = (2.0, 98.0);

/// 1-based band indices of the NIR and SWIR bands within each scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BandSelection {
    pub nir: usize,
    pub swir: usize,
}

impl Default for BandSelection {
    fn default() -> Self {
        Self { nir: 1, swir: 2 }
    }
}

/// Pre-fire NBR minus post-fire NBR, with the georeferencing of the pre-fire scene.
pub struct DeltaRaster {
    pub data: Buffer<f32>,
    pub geo_info: GeoInfo,
}

/// Where a full run writes its rasters. Only `classes` is mandatory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeverityOutputs {
    pub classes: PathBuf,
    pub delta: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub delta_preview: Option<PathBuf>,
}

pub struct SeverityResult {
    pub delta: DeltaRaster,
    pub classes: Buffer<u8>,
    pub summary: ClassSummary,
    /// `None` when the delta grid has no valid pixel.
    pub display_range: Option<DisplayRange>,
}

/// Runs NBR -> dNBR -> classification, one stage at a time.
pub struct SeverityProcessor {
    bands: BandSelection,
    classifier: Classifier,
    options: WriteOptions,
    ramp: ColorRamp,
}

impl SeverityProcessor {
    pub fn new(bands: BandSelection, options: WriteOptions) -> Self {
        Self {
            bands,
            classifier: Classifier::dnbr(),
            options,
            ramp: ColorRamp::default(),
        }
    }

    pub fn with_ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn ramp(&self) -> ColorRamp {
        self.ramp
    }

    /// NBR of one scene from its configured NIR and SWIR bands.
    pub fn scene_nbr(&self, scene: &Scene) -> Result<Buffer<f32>> {
        let nbr = NBR::new(0, 1, None);
        ensure!(
            scene.band_count() >= nbr.required_bands(),
            "{} needs at least {} bands but {} has {}",
            nbr.name(),
            nbr.required_bands(),
            scene.path.display(),
            scene.band_count()
        );
        let inputs = [scene.band(self.bands.nir)?, scene.band(self.bands.swir)?];
        let result = nbr.calculate(&inputs)?;

        log_stats(&format!("{} {}", nbr.name(), scene.path.display()), result.data());
        Ok(result)
    }

    /// Read one scene and write its NBR as a float raster.
    pub fn nbr(&self, input: &Path, output: &Path) -> Result<()> {
        let scene = read_scene(input)?;
        let index = self.scene_nbr(&scene)?;
        write_index(&index, &scene.geo_info, output, "NBR", &self.options)
    }

    pub fn delta_from_scenes(&self, pre: &Scene, post: &Scene) -> Result<DeltaRaster> {
        ensure!(
            pre.geo_info.shape() == post.geo_info.shape(),
            "Pre-fire scene {} is {:?} but post-fire scene {} is {:?}",
            pre.path.display(),
            pre.geo_info.shape(),
            post.path.display(),
            post.geo_info.shape()
        );
        if !pre.geo_info.same_georeference(&post.geo_info) {
            warn!(
                "{} and {} differ in transform or CRS; pixels are paired by grid position",
                pre.path.display(),
                post.path.display()
            );
        }

        let pre_nbr = self.scene_nbr(pre)?;
        let post_nbr = self.scene_nbr(post)?;
        let data = difference(&pre_nbr, &post_nbr)?;
        log_stats("dNBR", data.data());

        Ok(DeltaRaster {
            data,
            geo_info: pre.geo_info.clone(),
        })
    }

    /// Load both scenes and return their dNBR. Each file is closed once read.
    pub fn delta(&self, pre: &Path, post: &Path) -> Result<DeltaRaster> {
        let pre_scene = read_scene(pre)?;
        let post_scene = read_scene(post)?;
        self.delta_from_scenes(&pre_scene, &post_scene)
    }

    pub fn classify_delta(&self, delta: &DeltaRaster) -> (Buffer<u8>, ClassSummary) {
        let classes = self.classifier.classify(&delta.data);
        let summary =
            ClassSummary::from_classes(&classes, self.classifier.class_count(), &delta.geo_info);
        (classes, summary)
    }

    /// Classify an existing single-band dNBR raster.
    pub fn classify_file(&self, input: &Path, output: &Path) -> Result<ClassSummary> {
        let (data, geo_info) = read_scene(input)?.into_first_band()?;
        let delta = DeltaRaster { data, geo_info };
        let (classes, summary) = self.classify_delta(&delta);
        write_classes(&classes, &delta.geo_info, output, &self.options)?;
        Ok(summary)
    }

    /// Full run: dNBR, classes and whichever optional outputs are requested.
    pub fn run(
        &self,
        pre: &Path,
        post: &Path,
        outputs: &SeverityOutputs,
    ) -> Result<SeverityResult> {
        let delta = self.delta(pre, post)?;
        let (classes, summary) = self.classify_delta(&delta);
        write_classes(&classes, &delta.geo_info, &outputs.classes, &self.options)?;

        if let Some(path) = &outputs.delta {
            write_index(&delta.data, &delta.geo_info, path, "dNBR", &self.options)?;
        }

        let (low, high) = STRETCH_PERCENTILES;
        let display_range = DisplayRange::from_percentiles(delta.data.data(), low, high);
        match display_range {
            Some(range) => debug!("dNBR display range {:.4} to {:.4}", range.min, range.max),
            None => warn!("dNBR has no valid pixels; no display range"),
        }

        if let Some(path) = &outputs.preview {
            let rgba = render_classes(&classes, &SEVERITY_PALETTE);
            write_rgba(&rgba, &delta.geo_info, path, &self.options)?;
        }
        if let (Some(path), Some(range)) = (&outputs.delta_preview, display_range) {
            let rgba = render_continuous(&delta.data, self.ramp, range);
            write_rgba(&rgba, &delta.geo_info, path, &self.options)?;
        }

        info!(
            "Classified {} pixels, {} without data",
            summary.total_pixels,
            summary.pixels(self.classifier.no_data_class())
        );

        Ok(SeverityResult {
            delta,
            classes,
            summary,
            display_range,
        })
    }

    /// Map document for the rasters a run wrote: the continuous dNBR layer
    /// when it was written and has a display range, and the classified layer.
    pub fn map_document(
        &self,
        result: &SeverityResult,
        outputs: &SeverityOutputs,
        view: Option<MapView>,
    ) -> Result<MapDocument> {
        let mut document = MapDocument::new(view);
        if let (Some(path), Some(range)) = (&outputs.delta, result.display_range) {
            document.add_continuous("dNBR", path, self.ramp, range);
        }
        document.add_classified(
            "Burn severity",
            &outputs.classes,
            Legend::severity(),
            self.classifier.class_count(),
        )?;
        Ok(document)
    }
}

fn log_stats(label: &str, data: &[f32]) {
    let valid = data.iter().filter(|value| value.is_finite()).count();
    match data
        .iter()
        .filter(|value| value.is_finite())
        .minmax_by(|a, b| a.total_cmp(b))
    {
        MinMaxResult::NoElements => debug!("{}: no valid pixels", label),
        MinMaxResult::OneElement(value) => debug!("{}: single valid pixel {}", label, value),
        MinMaxResult::MinMax(min, max) => debug!(
            "{}: {} of {} pixels valid, range {} to {}",
            label,
            valid,
            data.len(),
            min,
            max
        ),
    }
}
