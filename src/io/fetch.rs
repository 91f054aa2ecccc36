// src/io/fetch.rs
use anyhow::{Context, Result};
use log::info;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Download `url` to `path` unless `path` already exists.
///
/// Returns `true` when a download happened. The body is streamed into a
/// sibling `.part` file and renamed into place once complete, so an aborted
/// download never looks like a cached scene on the next run.
pub fn fetch_if_missing(url: &str, path: &Path) -> Result<bool> {
    if path.exists() {
        info!("{} already present, skipping download", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    info!("Downloading {} -> {}", url, path.display());

    let client = reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .user_agent(concat!("burn-severity/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("HTTP request to {} failed", url))?
        .error_for_status()?;

    let partial = partial_path(path);
    let mut file = BufWriter::new(
        File::create(&partial)
            .with_context(|| format!("Failed to create {}", partial.display()))?,
    );
    let bytes = response
        .copy_to(&mut file)
        .with_context(|| format!("Failed to stream {}", url))?;
    file.flush()?;
    drop(file);

    fs::rename(&partial, path)
        .with_context(|| format!("Failed to move download into {}", path.display()))?;

    info!("Downloaded {} bytes to {}", bytes, path.display());
    Ok(true)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
