use crate::error::{PreprocessError, Result};
use crate::io::Bounds;
use gdal::vector::LayerAccess;
use gdal::Dataset;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Area-of-interest boundary, copied out of the vector file so the handle can
/// be closed and the value shared between periods and threads
#[derive(Debug, Clone)]
pub struct Aoi {
    pub path: PathBuf,
    /// Envelope of the first feature's geometry
    pub envelope: Bounds,
    /// CRS of the layer, when the file declares one
    pub spatial_ref_wkt: Option<String>,
    pub geometry_name: String,
    pub feature_count: u64,
}

impl Aoi {
    /// Load the first feature of the first layer of a vector file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PreprocessError::MissingInput(format!(
                "AOI file {}",
                path.display()
            )));
        }

        let dataset = Dataset::open(path).map_err(|e| {
            PreprocessError::InvalidVectorData(format!("{}: {}", path.display(), e))
        })?;

        if dataset.layer_count() as usize == 0 {
            return Err(PreprocessError::InvalidVectorData(format!(
                "{} has no vector layer",
                path.display()
            )));
        }

        let mut layer = dataset.layer(0)?;
        let feature_count = layer.feature_count();
        let spatial_ref_wkt = layer.spatial_ref().and_then(|srs| srs.to_wkt().ok());

        let (envelope, geometry_name) = {
            let feature = layer.features().next().ok_or_else(|| {
                PreprocessError::InvalidVectorData(format!("{} has no features", path.display()))
            })?;
            let geometry = feature.geometry().ok_or_else(|| {
                PreprocessError::InvalidVectorData(format!(
                    "first feature of {} has no geometry",
                    path.display()
                ))
            })?;
            let env = geometry.envelope();
            (
                Bounds {
                    min_x: env.MinX,
                    min_y: env.MinY,
                    max_x: env.MaxX,
                    max_y: env.MaxY,
                },
                geometry.geometry_name(),
            )
        };

        if !(envelope.width() > 0.0 && envelope.height() > 0.0) {
            return Err(PreprocessError::InvalidVectorData(format!(
                "degenerate AOI envelope {:?}",
                envelope
            )));
        }

        if feature_count > 1 {
            warn!(
                "{} holds {} features, only the first one is used",
                path.display(),
                feature_count
            );
        }
        if geometry_name.to_ascii_uppercase().starts_with("MULTI") {
            warn!(
                "AOI geometry is a {}, clipping to the envelope of all its parts",
                geometry_name
            );
        }

        info!(
            "Opened AOI {} ({}, envelope x: {:.1}..{:.1}, y: {:.1}..{:.1})",
            path.display(),
            geometry_name,
            envelope.min_x,
            envelope.max_x,
            envelope.min_y,
            envelope.max_y
        );

        Ok(Self {
            path: path.to_path_buf(),
            envelope,
            spatial_ref_wkt,
            geometry_name,
            feature_count,
        })
    }
}
