// src/processing/summary.rs
use gdal::raster::Buffer;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

use crate::io::GeoInfo;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCount {
    pub code: u8,
    pub pixels: u64,
    /// Squared CRS units (m² for projected scenes).
    pub area: f64,
}

/// Pixel counts and areas per class code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub classes: Vec<ClassCount>,
    pub total_pixels: u64,
}

impl ClassSummary {
    /// Tally `classes` over `class_count` codes. Codes outside that range are ignored.
    pub fn from_classes(classes: &Buffer<u8>, class_count: usize, geo_info: &GeoInfo) -> Self {
        let mut counts = vec![0u64; class_count];
        for &code in classes.data() {
            if let Some(count) = counts.get_mut(code as usize) {
                *count += 1;
            }
        }

        let pixel_area = geo_info.pixel_area();
        Self {
            classes: counts
                .iter()
                .enumerate()
                .map(|(code, &pixels)| ClassCount {
                    code: code as u8,
                    pixels,
                    area: pixels as f64 * pixel_area,
                })
                .collect(),
            total_pixels: classes.data().len() as u64,
        }
    }

    pub fn pixels(&self, code: u8) -> u64 {
        self.classes
            .get(code as usize)
            .map(|class| class.pixels)
            .unwrap_or(0)
    }
}

impl fmt::Display for ClassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .classes
            .iter()
            .map(|class| {
                let share = if self.total_pixels == 0 {
                    0.0
                } else {
                    class.pixels as f64 * 100.0 / self.total_pixels as f64
                };
                format!(
                    "  class {}: {:>10} px {:>6.2}% {:>14.1}",
                    class.code, class.pixels, share, class.area
                )
            })
            .join("\n");
        write!(f, "{}", rows)
    }
}
