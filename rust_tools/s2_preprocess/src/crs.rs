use crate::error::{PreprocessError, Result};
use crate::io::RasterMetadata;
use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};
use log::{debug, warn};
use std::path::Path;

/// Short human-readable label, e.g. `EPSG:32633`
pub fn describe(srs: &SpatialRef) -> String {
    match (srs.auth_name(), srs.auth_code()) {
        (Ok(name), Ok(code)) => format!("{}:{}", name, code),
        _ => srs
            .to_proj4()
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|_| "unknown CRS".to_string()),
    }
}

fn parse_normalised(wkt: &str) -> Result<SpatialRef> {
    let mut srs = SpatialRef::from_wkt(wkt)?;
    // Layers and rasters may report different data axis mappings for the same CRS
    srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    Ok(srs)
}

/// Whether two WKT strings name the same CRS; two rasters without one compare equal
pub fn same_crs(a_wkt: &str, b_wkt: &str) -> Result<bool> {
    match (a_wkt.trim().is_empty(), b_wkt.trim().is_empty()) {
        (true, true) => Ok(true),
        (false, false) => Ok(parse_normalised(a_wkt)? == parse_normalised(b_wkt)?),
        _ => Ok(false),
    }
}

/// Require the AOI to be expressed in the raster's CRS.
///
/// An AOI without a CRS is accepted with a warning; its coordinates are then
/// taken to be in the raster's CRS.
pub fn ensure_same_crs(raster_path: &Path, raster_wkt: &str, aoi_wkt: Option<&str>) -> Result<()> {
    if raster_wkt.trim().is_empty() {
        return Err(PreprocessError::invalid_raster(
            raster_path,
            "raster has no coordinate reference system",
        ));
    }
    let raster_srs = parse_normalised(raster_wkt)?;

    let Some(aoi_wkt) = aoi_wkt else {
        warn!(
            "AOI has no coordinate reference system, assuming {}",
            describe(&raster_srs)
        );
        return Ok(());
    };
    let aoi_srs = parse_normalised(aoi_wkt)?;

    if raster_srs != aoi_srs {
        return Err(PreprocessError::CoordinateSystemMismatch {
            raster: describe(&raster_srs),
            aoi: describe(&aoi_srs),
        });
    }

    debug!("AOI and raster share {}", describe(&raster_srs));
    Ok(())
}

/// Native pixel size rounded to whole map units
pub fn native_resolution(metadata: &RasterMetadata, path: &Path) -> Result<f64> {
    if (metadata.pixel_width - metadata.pixel_height).abs() > 1e-9 {
        warn!(
            "Non-square pixels in {} ({:.6} x {:.6}), using width",
            path.display(),
            metadata.pixel_width,
            metadata.pixel_height
        );
    }

    let resolution = metadata.pixel_width.round();
    if resolution < 1.0 {
        return Err(PreprocessError::invalid_raster(
            path,
            format!(
                "pixel size {:.6} rounds to zero (geographic CRS?)",
                metadata.pixel_width
            ),
        ));
    }
    Ok(resolution)
}
