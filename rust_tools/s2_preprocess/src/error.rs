use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid AOI vector data: {0}")]
    InvalidVectorData(String),

    #[error("Invalid raster {path}: {reason}")]
    InvalidRasterData { path: PathBuf, reason: String },

    #[error("No input rasters found in {0}")]
    NoInputData(PathBuf),

    #[error("Coordinate system mismatch: raster is {raster}, AOI is {aoi}")]
    CoordinateSystemMismatch { raster: String, aoi: String },

    #[error("AOI envelope does not intersect raster {0}")]
    AoiOutsideRaster(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid compression type: {0}")]
    InvalidCompression(String),

    #[error("Invalid tile size: {0} (must be multiple of 16)")]
    InvalidTileSize(usize),
}

impl PreprocessError {
    pub(crate) fn invalid_raster(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PreprocessError::InvalidRasterData {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PreprocessError>;
