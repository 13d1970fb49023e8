use crate::crs::same_crs;
use crate::error::{PreprocessError, Result};
use crate::io::{build_composite, extract_metadata, materialize, open_raster};
use crate::layout::{has_extension, sorted_entries};
use crate::options::OutputOptions;
use crate::scene::acquisition_timestamp;
use gdal::Dataset;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const MOSAIC_NAME: &str = "clipped-mos.tif";

/// Sort so that later acquisitions come last; names without a timestamp go
/// first, ties are broken by file name.
pub fn order_by_acquisition(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|p| {
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (acquisition_timestamp(&name), name)
    });
}

/// GeoTIFFs of `dir` to merge, in precedence order, excluding a previous mosaic
pub fn mosaic_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && (has_extension(p, "tif") || has_extension(p, "tiff")))
        .filter(|p| p.file_name().map_or(true, |n| n != MOSAIC_NAME))
        .collect();
    order_by_acquisition(&mut inputs);
    Ok(inputs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Every source must match the first in band count, data type and CRS; a
/// plain VRT mosaic would otherwise leave the odd ones out with only a warning.
fn ensure_compatible(inputs: &[PathBuf], datasets: &[Dataset]) -> Result<()> {
    let mut sources = inputs.iter().zip(datasets);
    let Some((first_path, first)) = sources.next() else {
        return Ok(());
    };
    let reference = extract_metadata(first, first_path)?;
    let first_name = file_name(first_path);

    for (path, dataset) in sources {
        let metadata = extract_metadata(dataset, path)?;
        let reason = if metadata.band_count != reference.band_count {
            Some(format!(
                "{} bands where {} has {}",
                metadata.band_count, first_name, reference.band_count
            ))
        } else if metadata.data_type != reference.data_type {
            Some(format!(
                "data type {} where {} has {}",
                metadata.data_type, first_name, reference.data_type
            ))
        } else if !same_crs(&metadata.projection, &reference.projection)? {
            Some(format!("coordinate reference system differs from {}", first_name))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(PreprocessError::invalid_raster(
                path,
                format!("cannot be mosaicked: {}", reason),
            ));
        }
    }
    Ok(())
}

/// Merge `inputs` into `output`; where footprints overlap the last input wins
pub fn mosaic_files(inputs: &[PathBuf], output: &Path, options: &OutputOptions) -> Result<()> {
    let datasets = inputs
        .iter()
        .map(|p| {
            debug!("Mosaic source {}", p.display());
            open_raster(p)
        })
        .collect::<Result<Vec<_>>>()?;
    ensure_compatible(inputs, &datasets)?;

    let composite = build_composite(&datasets, &[])?;
    materialize(&composite, output, options)
}

/// Mosaic every clipped raster of `dir` into `<dir>/clipped-mos.tif`
pub fn mosaic_directory(dir: &Path, options: &OutputOptions) -> Result<PathBuf> {
    let inputs = mosaic_inputs(dir)?;
    if inputs.is_empty() {
        return Err(PreprocessError::NoInputData(dir.to_path_buf()));
    }

    let output = dir.join(MOSAIC_NAME);
    mosaic_files(&inputs, &output, options)?;

    info!(
        "Made mosaic of {} rasters: {}",
        inputs.len(),
        output.display()
    );
    Ok(output)
}
