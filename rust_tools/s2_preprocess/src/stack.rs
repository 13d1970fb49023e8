use crate::error::{PreprocessError, Result};
use crate::io::{build_composite, materialize, open_raster};
use crate::options::OutputOptions;
use crate::scene::{BandFile, Scene};
use gdal::Metadata;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub const STACKED_SUFFIX: &str = "_stacked.tif";

/// Stack the band files of one scene into `<export_dir>/<product>_stacked.tif`.
///
/// Returns `Ok(None)` without writing anything when the scene holds no band
/// file for the tier.
pub fn stack_scene(
    scene: &Scene,
    tier: &str,
    extension: &str,
    export_dir: &Path,
    options: &OutputOptions,
) -> Result<Option<PathBuf>> {
    info!("Processing scene {}", scene.product_name);

    let bands = scene.band_files(tier, extension)?;
    if bands.is_empty() {
        warn!(
            "No {} band files with extension '{}' in {}",
            tier, extension, scene.product_name
        );
        return Ok(None);
    }

    let output = export_dir.join(format!("{}{}", scene.product_name, STACKED_SUFFIX));
    stack_bands(&bands, &output, options)?;

    info!(
        "Scene {} is now a {}-band GeoTIFF: {}",
        scene.product_name,
        bands.len(),
        output.display()
    );
    Ok(Some(output))
}

/// Write `bands` as consecutive bands of one GeoTIFF, in slice order.
///
/// All bands must share pixel dimensions; CRS and geotransform come from the first.
pub fn stack_bands(bands: &[BandFile], output: &Path, options: &OutputOptions) -> Result<()> {
    let mut datasets = Vec::with_capacity(bands.len());
    let mut expected_size: Option<(usize, usize)> = None;

    for band in bands {
        let dataset = open_raster(&band.path)?;
        let size = dataset.raster_size();
        match expected_size {
            None => expected_size = Some(size),
            Some(first) if first != size => {
                return Err(PreprocessError::invalid_raster(
                    &band.path,
                    format!(
                        "band {} is {}x{}, first band is {}x{}",
                        band.band, size.0, size.1, first.0, first.1
                    ),
                ));
            }
            Some(_) => {}
        }
        debug!("Band {} <- {}", band.band, band.path.display());
        datasets.push(dataset);
    }

    let composite = build_composite(&datasets, &["-separate".to_string()])?;
    for (i, band) in bands.iter().enumerate() {
        let mut raster_band = composite.rasterband(i + 1)?;
        raster_band.set_description(&band.band.to_string())?;
    }

    materialize(&composite, output, options)
}
