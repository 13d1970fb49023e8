use crate::aoi::Aoi;
use crate::crs::{ensure_same_crs, native_resolution};
use crate::error::{PreprocessError, Result};
use crate::io::{build_composite, extract_metadata, materialize, open_raster, Bounds};
use crate::options::OutputOptions;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const CLIPPED_SUFFIX: &str = "_aoi.tif";

/// Output grid of a clip: origin at the top-left of `bounds`, square pixels of `resolution`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub bounds: Bounds,
    pub resolution: f64,
    pub width: usize,
    pub height: usize,
}

impl ClipWindow {
    /// Part of `envelope` covered by `footprint`, gridded at `resolution`.
    ///
    /// Each axis gets at least one cell, so an overlap thinner than half a
    /// pixel still yields a one-pixel window. `None` when the two do not overlap.
    pub fn compute(envelope: &Bounds, footprint: &Bounds, resolution: f64) -> Option<Self> {
        let bounds = envelope.intersection(footprint)?;
        let cells = |extent: f64| ((extent / resolution + 0.5).floor() as usize).max(1);

        Some(Self {
            bounds,
            resolution,
            width: cells(bounds.width()),
            height: cells(bounds.height()),
        })
    }

    /// Extent of exactly `width` x `height` cells hung from the top-left corner of `bounds`
    pub fn grid_bounds(&self) -> Bounds {
        Bounds {
            min_x: self.bounds.min_x,
            min_y: self.bounds.max_y - self.height as f64 * self.resolution,
            max_x: self.bounds.min_x + self.width as f64 * self.resolution,
            max_y: self.bounds.max_y,
        }
    }

    /// VRT arguments selecting this window with nearest-neighbour sampling
    pub fn vrt_args(&self) -> Vec<String> {
        let grid = self.grid_bounds();
        vec![
            "-te".to_string(),
            grid.min_x.to_string(),
            grid.min_y.to_string(),
            grid.max_x.to_string(),
            grid.max_y.to_string(),
            "-tr".to_string(),
            self.resolution.to_string(),
            self.resolution.to_string(),
            "-r".to_string(),
            "nearest".to_string(),
        ]
    }
}

/// Crop `raster_path` to the AOI envelope at the raster's rounded native
/// resolution, writing `<out_dir>/<stem>_aoi.tif`.
///
/// The AOI must be in the raster's CRS; no reprojection takes place.
pub fn clip_raster(
    raster_path: &Path,
    aoi: &Aoi,
    out_dir: &Path,
    options: &OutputOptions,
) -> Result<PathBuf> {
    let image_name = raster_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PreprocessError::InvalidInput(format!("no file name in {}", raster_path.display()))
        })?;

    let dataset = open_raster(raster_path)?;
    let metadata = extract_metadata(&dataset, raster_path)?;

    ensure_same_crs(
        raster_path,
        &metadata.projection,
        aoi.spatial_ref_wkt.as_deref(),
    )?;
    let resolution = native_resolution(&metadata, raster_path)?;

    let window = ClipWindow::compute(&aoi.envelope, &metadata.footprint(), resolution)
        .ok_or_else(|| PreprocessError::AoiOutsideRaster(raster_path.to_path_buf()))?;
    debug!(
        "Clip window for {}: {}x{} cells at {} ({:?})",
        image_name, window.width, window.height, resolution, window.bounds
    );

    let composite = build_composite(std::slice::from_ref(&dataset), &window.vrt_args())?;
    let output = out_dir.join(format!("{}{}", image_name, CLIPPED_SUFFIX));
    materialize(&composite, &output, options)?;

    info!(
        "Clipped {} to {}x{} pixels: {}",
        image_name,
        window.width,
        window.height,
        output.display()
    );
    Ok(output)
}
