// src/lib.rs
pub mod batch;
pub mod cli;
pub mod io;
pub mod processing;
pub mod render;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
