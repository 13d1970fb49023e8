use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "s2-preprocess")]
#[command(about = "Stack, clip and mosaic Sentinel-2 scenes into one raster per period")]
#[command(version)]
#[command(author = "Huimori Project")]
pub struct Args {
    /// Working directory holding Downloads/, Mul_TIFFS/ and Clipped-Mos/
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// AOI boundary file with one polygon, relative to the root
    #[arg(long, value_name = "FILE", default_value = "aoi.shp")]
    pub aoi: PathBuf,

    /// Comma-separated period folders under Downloads/
    #[arg(long, value_name = "NAMES", value_delimiter = ',', default_values = ["Past", "Now"])]
    pub periods: Vec<String>,

    /// Resolution tier of the band images (IMG_DATA/R<TIER>)
    #[arg(long, value_name = "TIER", default_value = "20m")]
    pub resolution: String,

    /// Extension of the band image files
    #[arg(long, value_name = "EXT", default_value = "jp2")]
    pub band_extension: String,

    /// GeoTIFF compression (DEFLATE, LZW, ZSTD, NONE)
    #[arg(long, value_name = "ALG", default_value = "NONE")]
    pub compress: String,

    /// Tile size for tiled GeoTIFF output (0 writes strips)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub tile_size: usize,

    /// Do not unpack scene archives
    #[arg(long)]
    pub skip_extract: bool,

    /// Abort on the first failed item instead of collecting failures
    #[arg(long)]
    pub fail_fast: bool,

    /// Process periods concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Number of threads (default: all available)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
