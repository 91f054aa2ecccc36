// src/batch.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::{fetch_if_missing, WriteOptions};
use crate::processing::{BandSelection, SeverityOutputs, SeverityProcessor, SeverityResult};
use crate::render::{AnnotationStore, ColorRamp, MapView};

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub runs: Vec<RunConfig>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct GlobalParams {
    #[serde(flatten)]
    pub write: WriteOptions,
    #[serde(default)]
    pub bands: BandSelection,
    #[serde(default)]
    pub colormap: ColorRamp,
}

/// A local scene path, optionally backed by a URL fetched when the file is missing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SceneSource {
    pub path: PathBuf,
    pub url: Option<String>,
}

impl SceneSource {
    pub fn ensure_local(&self) -> Result<&Path> {
        if let Some(url) = &self.url {
            fetch_if_missing(url, &self.path)?;
        }
        Ok(&self.path)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub path: PathBuf,
    pub center: Option<[f64; 2]>,
    pub zoom: Option<u8>,
    /// JSON array of annotation events replayed into the document.
    pub annotations: Option<PathBuf>,
}

impl MapConfig {
    pub fn view(&self) -> Option<MapView> {
        self.center.map(|center| MapView {
            center,
            zoom: self.zoom.unwrap_or(DEFAULT_ZOOM),
        })
    }
}

pub const DEFAULT_ZOOM: u8 = 10;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub name: Option<String>,
    pub pre: SceneSource,
    pub post: SceneSource,
    pub output: PathBuf,
    pub delta_output: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub delta_preview: Option<PathBuf>,
    pub map: Option<MapConfig>,
    pub bands: Option<BandSelection>,
    pub colormap: Option<ColorRamp>,
    pub compress: Option<String>,
    pub compress_level: Option<u8>,
    pub tiled: Option<bool>,
}

impl RunConfig {
    /// Writer options with this run's overrides applied over `global`.
    pub fn write_options(&self, global: &GlobalParams) -> WriteOptions {
        WriteOptions {
            compress: self
                .compress
                .clone()
                .unwrap_or_else(|| global.write.compress.clone()),
            compress_level: self.compress_level.unwrap_or(global.write.compress_level),
            tiled: self.tiled.unwrap_or(global.write.tiled),
        }
    }

    pub fn outputs(&self) -> SeverityOutputs {
        SeverityOutputs {
            classes: self.output.clone(),
            delta: self.delta_output.clone(),
            preview: self.preview.clone(),
            delta_preview: self.delta_preview.clone(),
        }
    }

    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.output.display().to_string())
    }
}

pub fn load_config(config_path: &Path) -> Result<BatchConfig> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;
    let config: BatchConfig = serde_json::from_str(&config_content)
        .with_context(|| format!("Invalid config {}", config_path.display()))?;
    Ok(config)
}

/// Fetch missing scenes, run the pipeline and write the map document, if configured.
pub fn run_one(run: &RunConfig, global: &GlobalParams) -> Result<SeverityResult> {
    let pre = run.pre.ensure_local()?;
    let post = run.post.ensure_local()?;

    let bands = run.bands.unwrap_or(global.bands);
    let processor = SeverityProcessor::new(bands, run.write_options(global))
        .with_ramp(run.colormap.unwrap_or(global.colormap));

    let outputs = run.outputs();
    let result = processor.run(pre, post, &outputs)?;

    if let Some(map) = &run.map {
        let mut document = processor.map_document(&result, &outputs, map.view())?;
        if let Some(log) = &map.annotations {
            document.attach_annotations(&AnnotationStore::from_event_log(log)?);
        }
        document.write(&map.path)?;
    }

    Ok(result)
}

pub fn process_batch(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Starting batch processing with {} runs...", config.runs.len());

    for (i, run) in config.runs.iter().enumerate() {
        println!("[{}/{}] Processing {}", i + 1, config.runs.len(), run.label());

        let result = run_one(run, &config.global)
            .with_context(|| format!("Run {} failed", run.label()))?;
        println!("{}", result.summary);
    }

    println!("Batch processing complete!");
    Ok(())
}
