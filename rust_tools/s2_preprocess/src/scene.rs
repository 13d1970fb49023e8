use crate::error::{PreprocessError, Result};
use crate::layout::{has_extension, sorted_entries};
use chrono::NaiveDateTime;
use log::{debug, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// Spectral band identifier, ordered by wavelength (`B08 < B8A < B09`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BandId {
    number: u8,
    narrow: bool,
}

impl BandId {
    /// Parse a token such as `B02` or `B8A`
    pub fn parse(token: &str) -> Option<Self> {
        let rest = token.strip_prefix('B')?;
        let bytes = rest.as_bytes();
        if bytes.len() != 2 || !bytes[0].is_ascii_digit() {
            return None;
        }
        let first = bytes[0] - b'0';
        match bytes[1] {
            b'A' => Some(Self {
                number: first,
                narrow: true,
            }),
            d if d.is_ascii_digit() => Some(Self {
                number: first * 10 + (d - b'0'),
                narrow: false,
            }),
            _ => None,
        }
    }

    /// First band token in an underscore-separated file stem
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        stem.split('_').find_map(Self::parse)
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.narrow {
            write!(f, "B{}A", self.number)
        } else {
            write!(f, "B{:02}", self.number)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandFile {
    pub band: BandId,
    pub path: PathBuf,
}

/// One extracted satellite product directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub path: PathBuf,
    pub product_name: String,
}

impl Scene {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let product_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, product_name }
    }

    /// `GRANULE/<granule>/IMG_DATA/R<tier>` inside the product
    pub fn band_dir(&self, tier: &str) -> Result<PathBuf> {
        let granule_root = self.path.join("GRANULE");
        if !granule_root.is_dir() {
            return Err(PreprocessError::MissingInput(format!(
                "{} has no GRANULE folder",
                self.path.display()
            )));
        }

        let granules: Vec<PathBuf> = sorted_entries(&granule_root)?
            .into_iter()
            .filter(|p| p.is_dir())
            .collect();
        let granule = granules.first().ok_or_else(|| {
            PreprocessError::MissingInput(format!("no granule in {}", granule_root.display()))
        })?;
        if granules.len() > 1 {
            warn!(
                "{} holds {} granules, using {}",
                self.product_name,
                granules.len(),
                granule.display()
            );
        }

        let dir = granule.join("IMG_DATA").join(format!("R{}", tier));
        if !dir.is_dir() {
            return Err(PreprocessError::MissingInput(format!(
                "band folder {}",
                dir.display()
            )));
        }
        Ok(dir)
    }

    /// Band files of the given resolution tier, in spectral order
    pub fn band_files(&self, tier: &str, extension: &str) -> Result<Vec<BandFile>> {
        let dir = self.band_dir(tier)?;
        find_band_files(&dir, extension)
    }
}

/// Band files in `dir`, sorted by band then file name
pub fn find_band_files(dir: &Path, extension: &str) -> Result<Vec<BandFile>> {
    let mut bands: Vec<BandFile> = sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && has_extension(p, extension))
        .filter_map(|path| {
            let band = BandId::from_file_name(&path);
            if band.is_none() {
                debug!("Ignoring non-band file {}", path.display());
            }
            band.map(|band| BandFile { band, path })
        })
        .collect();
    bands.sort_by(|a, b| a.band.cmp(&b.band).then_with(|| a.path.cmp(&b.path)));
    Ok(bands)
}

/// Extracted scene directories of a period folder, sorted by name
pub fn discover_scenes(dir: &Path) -> Result<Vec<Scene>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .map(Scene::new)
        .collect())
}

/// First `YYYYMMDDTHHMMSS` token of a file or product name
pub fn acquisition_timestamp(name: &str) -> Option<NaiveDateTime> {
    name.split(|c: char| c == '_' || c == '.' || c == '-')
        .filter(|t| t.len() == 15 && t.as_bytes()[8] == b'T')
        .find_map(|t| NaiveDateTime::parse_from_str(t, "%Y%m%dT%H%M%S").ok())
}
