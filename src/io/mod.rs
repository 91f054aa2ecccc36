// src/io/mod.rs
pub mod fetch;
pub mod reader;
pub mod writer;

pub use fetch::fetch_if_missing;
pub use reader::{read_scene, GeoInfo, Scene};
pub use writer::{write_classes, write_index, write_rgba, WriteOptions};
