// src/render/legend.rs
use gdal::raster::Buffer;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::colormap::Rgb;

/// One color per class code 0-8. Class 0 and the no-data class 8 share the
/// background color.
pub const SEVERITY_PALETTE: [Rgb; 9] = [
    Rgb::new(255, 255, 255), // 0: below -0.251
    Rgb::new(122, 135, 55),  // 1: enhanced regrowth
    Rgb::new(172, 190, 77),  // 2: unburned
    Rgb::new(10, 224, 66),   // 3: low
    Rgb::new(255, 247, 11),  // 4: moderate-low
    Rgb::new(255, 175, 56),  // 5: moderate-high
    Rgb::new(255, 100, 27),  // 6: high
    Rgb::new(164, 31, 214),  // 7: above 2.0
    Rgb::new(255, 255, 255), // 8: no data
];

pub const SEVERITY_LABELS: [&str; 9] = [
    "Below -0.251",
    "Enhanced Regrowth (-0.251 to -0.100)",
    "Unburned (-0.100 to 0.100)",
    "Low Severity (0.100 to 0.270)",
    "Moderate-low Severity (0.270 to 0.440)",
    "Moderate-high Severity (0.440 to 0.660)",
    "High Severity (0.660 to 2.000)",
    "Above 2.000",
    "No Data",
];

/// Legend metadata for a classified layer; `labels[i]` and `colors[i]` describe code `i`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Legend {
    pub title: String,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
}

impl Legend {
    pub fn severity() -> Self {
        Self {
            title: "dNBR Burn Severity".to_string(),
            labels: SEVERITY_LABELS.iter().map(|label| label.to_string()).collect(),
            colors: SEVERITY_PALETTE.iter().map(|color| color.to_hex()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn to_text(&self) -> String {
        let rows = self
            .labels
            .iter()
            .zip(&self.colors)
            .enumerate()
            .map(|(code, (label, color))| format!("  {}  {}  {}", code, color, label))
            .join("\n");
        format!("{}\n{}", self.title, rows)
    }
}

/// Colorize a class grid into pixel-interleaved RGBA with `palette[code]`.
///
/// Codes past the end of the palette render transparent.
pub fn render_classes(classes: &Buffer<u8>, palette: &[Rgb]) -> Vec<u8> {
    classes
        .data()
        .par_iter()
        .flat_map_iter(|&code| match palette.get(code as usize) {
            Some(color) => [color.r, color.g, color.b, 255],
            None => [0, 0, 0, 0],
        })
        .collect()
}
