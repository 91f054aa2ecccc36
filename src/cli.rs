use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::io::WriteOptions;
use crate::processing::BandSelection;

#[derive(Parser)]
#[command(name = "burn-severity")]
#[command(version, about = "Burn severity mapping from pre/post-fire imagery")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output file path
    #[arg(short, long, default_value = "output.tif", global = true)]
    pub output: PathBuf,

    /// GeoTIFF compression (DEFLATE, ZSTD, LZW, NONE)
    #[arg(long, default_value = "DEFLATE", global = true)]
    pub compress: String,

    /// Compression level (DEFLATE 1-9, ZSTD 1-22)
    #[arg(long, default_value = "6", global = true)]
    pub compress_level: u8,

    /// Write striped instead of tiled GeoTIFFs
    #[arg(long, global = true)]
    pub no_tiled: bool,

    /// Worker threads for per-pixel kernels (defaults to the number of CPUs)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            compress: self.compress.clone(),
            compress_level: self.compress_level,
            tiled: !self.no_tiled,
        }
    }
}

#[derive(clap::Args, Clone, Copy)]
pub struct BandArgs {
    /// 1-based index of the near-infrared band
    #[arg(long, default_value = "1")]
    pub nir_band: usize,

    /// 1-based index of the shortwave-infrared band
    #[arg(long, default_value = "2")]
    pub swir_band: usize,
}

impl From<BandArgs> for BandSelection {
    fn from(args: BandArgs) -> Self {
        BandSelection {
            nir: args.nir_band,
            swir: args.swir_band,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalized Burn Ratio of one scene: (NIR-SWIR)/(NIR+SWIR)
    Nbr {
        /// Multiband scene
        #[arg(short = 'i', long)]
        input: PathBuf,

        #[command(flatten)]
        bands: BandArgs,
    },

    /// Differenced NBR: NBR(pre) - NBR(post)
    Dnbr {
        /// Pre-fire scene
        #[arg(long)]
        pre: PathBuf,

        /// Post-fire scene
        #[arg(long)]
        post: PathBuf,

        #[command(flatten)]
        bands: BandArgs,
    },

    /// Classify an existing dNBR raster into severity classes 0-8
    Classify {
        /// Single-band dNBR raster
        #[arg(short = 'i', long)]
        input: PathBuf,
    },

    /// Full pipeline: NBR, dNBR, classes, optional previews and map document
    Severity {
        /// Pre-fire scene
        #[arg(long)]
        pre: PathBuf,

        /// Post-fire scene
        #[arg(long)]
        post: PathBuf,

        #[command(flatten)]
        bands: BandArgs,

        /// Also write the continuous dNBR raster here
        #[arg(long)]
        delta_output: Option<PathBuf>,

        /// RGBA preview of the classes
        #[arg(long)]
        preview: Option<PathBuf>,

        /// RGBA preview of the dNBR, stretched to its 2nd/98th percentiles
        #[arg(long)]
        delta_preview: Option<PathBuf>,

        /// Map document (JSON) describing layers and legend
        #[arg(long)]
        map: Option<PathBuf>,

        /// Map center as LAT,LON
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        center: Option<Vec<f64>>,

        /// Map zoom level
        #[arg(long, default_value = "10")]
        zoom: u8,

        /// JSON array of annotation events to include in the map document
        #[arg(long, requires = "map")]
        annotations: Option<PathBuf>,
    },

    /// Download a scene unless it is already present at --output
    Fetch {
        #[arg(long)]
        url: String,
    },

    /// Run every pipeline listed in a JSON config file
    Batch {
        #[arg(short = 'c', long)]
        config: PathBuf,
    },

    /// Print the severity legend
    Legend {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
