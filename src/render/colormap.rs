// src/render/colormap.rs
use gdal::raster::Buffer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, the form map widgets expect in legends.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Ramps available for the continuous dNBR layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRamp {
    /// Green -> Yellow -> Red; low (regrowth) green, high (burned) red
    #[default]
    RdYlGnReversed,
    /// Blue -> White -> Red
    BlueWhiteRed,
    /// Black -> White
    Grayscale,
}

impl ColorRamp {
    /// Name under which the ramp is known to matplotlib-based map widgets.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RdYlGnReversed => "RdYlGn_r",
            Self::BlueWhiteRed => "RdBu_r",
            Self::Grayscale => "gray",
        }
    }
}

const RDYLGN_REVERSED_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 0, 104, 55),
    ColorStop::new(0.25, 166, 217, 106),
    ColorStop::new(0.50, 255, 255, 191),
    ColorStop::new(0.75, 244, 109, 67),
    ColorStop::new(1.00, 165, 0, 38),
];

const BLUE_WHITE_RED_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}

/// Evaluate a ramp at normalized position `t`, clamped to [0, 1].
pub fn evaluate(ramp: ColorRamp, t: f64) -> Rgb {
    match ramp {
        ColorRamp::RdYlGnReversed => multi_stop(RDYLGN_REVERSED_STOPS, t),
        ColorRamp::BlueWhiteRed => multi_stop(BLUE_WHITE_RED_STOPS, t),
        ColorRamp::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
    }
}

/// Value range mapped onto the ends of a color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    /// Range between the `low` and `high` percentiles of the finite values in `data`.
    ///
    /// `None` when no finite value exists.
    pub fn from_percentiles(data: &[f32], low: f64, high: f64) -> Option<Self> {
        let mut valid: Vec<f64> = data
            .iter()
            .filter(|value| value.is_finite())
            .map(|&value| value as f64)
            .collect();
        if valid.is_empty() {
            return None;
        }
        valid.par_sort_unstable_by(f64::total_cmp);

        Some(Self {
            min: percentile_sorted(&valid, low),
            max: percentile_sorted(&valid, high),
        })
    }

    /// Position of `value` inside the range, unclamped.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            0.5
        } else {
            (value - self.min) / span
        }
    }
}

/// `q`-th percentile (0-100) of ascending `sorted`, interpolating linearly
/// between the two nearest order statistics.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 100.0);
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Colorize a continuous grid into pixel-interleaved RGBA; missing pixels are transparent.
pub fn render_continuous(grid: &Buffer<f32>, ramp: ColorRamp, range: DisplayRange) -> Vec<u8> {
    grid.data()
        .par_iter()
        .flat_map_iter(|&value| {
            if value.is_finite() {
                let color = evaluate(ramp, range.normalize(value as f64));
                [color.r, color.g, color.b, 255]
            } else {
                [0, 0, 0, 0]
            }
        })
        .collect()
}
