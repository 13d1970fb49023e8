use crate::error::{PreprocessError, Result};
use crate::options::OutputOptions;
use gdal::programs::raster::{build_vrt, BuildVRTOptions};
use gdal::raster::{GdalDataType, RasterBand};
use gdal::{Dataset, DriverManager};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Axis-aligned rectangle in map units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Overlapping part of two rectangles, `None` when they only touch or are disjoint
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);

        if min_x < max_x && min_y < max_y {
            Some(Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct RasterMetadata {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub data_type: GdalDataType,
    pub geotransform: [f64; 6],
    pub projection: String,
    pub nodata: Option<f64>,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl RasterMetadata {
    /// Extent covered by the pixel grid (rotation terms are ignored)
    pub fn footprint(&self) -> Bounds {
        let gt = &self.geotransform;
        let x_end = gt[0] + self.width as f64 * gt[1];
        let y_end = gt[3] + self.height as f64 * gt[5];
        Bounds {
            min_x: gt[0].min(x_end),
            min_y: gt[3].min(y_end),
            max_x: gt[0].max(x_end),
            max_y: gt[3].max(y_end),
        }
    }
}

/// Open a raster, reporting failures against the offending path
pub fn open_raster(path: &Path) -> Result<Dataset> {
    debug!("Opening raster: {}", path.display());
    Dataset::open(path).map_err(|e| PreprocessError::invalid_raster(path, e.to_string()))
}

/// Extract metadata from a dataset without reading pixel data
pub fn extract_metadata(dataset: &Dataset, path: &Path) -> Result<RasterMetadata> {
    let band_count = dataset.raster_count() as usize;
    if band_count == 0 {
        return Err(PreprocessError::invalid_raster(path, "raster has no bands"));
    }

    let rasterband: RasterBand = dataset.rasterband(1)?;
    let (width, height) = dataset.raster_size();

    if width == 0 || height == 0 {
        return Err(PreprocessError::invalid_raster(
            path,
            format!("invalid dimensions {}x{}", width, height),
        ));
    }

    let geotransform = dataset
        .geo_transform()
        .map_err(|_| PreprocessError::invalid_raster(path, "raster is not georeferenced"))?;
    let pixel_width = geotransform[1].abs();
    let pixel_height = geotransform[5].abs();

    if pixel_width <= 0.0 {
        return Err(PreprocessError::invalid_raster(
            path,
            format!("non-positive pixel size {}", pixel_width),
        ));
    }

    Ok(RasterMetadata {
        width,
        height,
        band_count,
        data_type: rasterband.band_type(),
        geotransform,
        projection: dataset.projection(),
        nodata: rasterband.no_data_value(),
        pixel_width,
        pixel_height,
    })
}

/// Build an in-memory VRT over `datasets`; sources later in the slice win where they overlap
pub fn build_composite(datasets: &[Dataset], args: &[String]) -> Result<Dataset> {
    debug!(
        "Building virtual composite over {} datasets (args: {:?})",
        datasets.len(),
        args
    );
    let options = if args.is_empty() {
        None
    } else {
        Some(BuildVRTOptions::new(args.iter().map(String::as_str))?)
    };
    Ok(build_vrt(None, datasets, options)?)
}

/// Write `source` to a GeoTIFF at `path`.
///
/// The output handle is flushed and closed before this returns. A partially
/// written file is removed when the copy fails.
pub fn materialize(source: &Dataset, path: &Path, options: &OutputOptions) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = options.to_csl()?;

    let written = source
        .create_copy(&driver, path, &creation_options)
        .and_then(|mut output| output.flush_cache());

    if let Err(e) = written {
        if path.exists() {
            if let Err(rm) = fs::remove_file(path) {
                warn!("Could not remove partial output {}: {}", path.display(), rm);
            }
        }
        return Err(e.into());
    }

    debug!("Materialized {}", path.display());
    Ok(())
}
