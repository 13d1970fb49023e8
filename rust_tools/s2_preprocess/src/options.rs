use crate::error::{PreprocessError, Result};
use gdal::cpl::CslStringList;

const VALID_COMPRESSION: [&str; 4] = ["DEFLATE", "LZW", "ZSTD", "NONE"];

/// GeoTIFF creation options shared by every materialized output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub compression: String,
    /// Block size for tiled output; 0 writes striped files
    pub tile_size: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            compression: "NONE".to_string(),
            tile_size: 0,
        }
    }
}

impl OutputOptions {
    pub fn new(compression: &str, tile_size: usize) -> Result<Self> {
        let compression = compression.to_ascii_uppercase();
        validate_compression(&compression)?;
        validate_tile_size(tile_size)?;
        Ok(Self {
            compression,
            tile_size,
        })
    }

    /// Creation options in `KEY=VALUE` form
    pub fn creation_options(&self) -> Vec<String> {
        let mut opts = vec![format!("COMPRESS={}", self.compression)];
        if self.tile_size > 0 {
            opts.push("TILED=YES".to_string());
            opts.push(format!("BLOCKXSIZE={}", self.tile_size));
            opts.push(format!("BLOCKYSIZE={}", self.tile_size));
        }
        opts.push("BIGTIFF=IF_SAFER".to_string());
        opts
    }

    pub fn to_csl(&self) -> Result<CslStringList> {
        let mut list = CslStringList::new();
        for opt in self.creation_options() {
            list.add_string(&opt)?;
        }
        Ok(list)
    }
}

pub fn validate_compression(compression: &str) -> Result<()> {
    if !VALID_COMPRESSION.contains(&compression) {
        return Err(PreprocessError::InvalidCompression(compression.to_string()));
    }
    Ok(())
}

/// Tile size must be 0 (striped) or a multiple of 16
pub fn validate_tile_size(tile_size: usize) -> Result<()> {
    if tile_size % 16 != 0 {
        return Err(PreprocessError::InvalidTileSize(tile_size));
    }
    Ok(())
}
