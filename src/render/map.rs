// src/render/map.rs
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::annotation::AnnotationStore;
use super::colormap::{ColorRamp, DisplayRange};
use super::legend::Legend;

/// Initial map center as `[lat, lon]` plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerStyle {
    Continuous { colormap: String, range: DisplayRange },
    Classified { colors: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerSpec {
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub style: LayerStyle,
}

/// What an interactive map widget should draw: raster layers by file path,
/// how to color them, the legend, the initial view and the current annotations.
/// Reading the rasters and compositing tiles is the widget's job.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapDocument {
    pub view: Option<MapView>,
    pub layers: Vec<LayerSpec>,
    pub legend: Option<Legend>,
    pub annotations: Value,
}

impl MapDocument {
    pub fn new(view: Option<MapView>) -> Self {
        Self {
            view,
            layers: Vec::new(),
            legend: None,
            annotations: AnnotationStore::new().to_geojson(),
        }
    }

    pub fn add_continuous(
        &mut self,
        name: &str,
        path: &Path,
        ramp: ColorRamp,
        range: DisplayRange,
    ) {
        self.layers.push(LayerSpec {
            name: name.to_string(),
            path: path.to_path_buf(),
            style: LayerStyle::Continuous {
                colormap: ramp.name().to_string(),
                range,
            },
        });
    }

    /// Add a classified layer colored by `legend`, which also becomes the document legend.
    ///
    /// The legend needs one label and one color for each of the raster's `class_count` codes.
    pub fn add_classified(
        &mut self,
        name: &str,
        path: &Path,
        legend: Legend,
        class_count: usize,
    ) -> Result<()> {
        ensure!(
            legend.labels.len() == legend.colors.len(),
            "Legend has {} labels but {} colors",
            legend.labels.len(),
            legend.colors.len()
        );
        ensure!(
            legend.len() == class_count,
            "Legend has {} entries for a raster with {} class codes",
            legend.len(),
            class_count
        );
        self.layers.push(LayerSpec {
            name: name.to_string(),
            path: path.to_path_buf(),
            style: LayerStyle::Classified {
                colors: legend.colors.clone(),
            },
        });
        self.legend = Some(legend);
        Ok(())
    }

    pub fn attach_annotations(&mut self, store: &AnnotationStore) {
        self.annotations = store.to_geojson();
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create map document {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
