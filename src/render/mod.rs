// src/render/mod.rs
pub mod annotation;
pub mod colormap;
pub mod legend;
pub mod map;

pub use annotation::{Annotation, AnnotationEvent, AnnotationStore};
pub use colormap::{render_continuous, ColorRamp, DisplayRange, Rgb};
pub use legend::{render_classes, Legend, SEVERITY_LABELS, SEVERITY_PALETTE};
pub use map::{LayerSpec, LayerStyle, MapDocument, MapView};
