use crate::error::{PreprocessError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const DOWNLOADS_DIR: &str = "Downloads";
pub const STACKED_DIR: &str = "Mul_TIFFS";
pub const CLIPPED_DIR: &str = "Clipped-Mos";

/// Fixed directory tree under a working root
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archives and extracted scenes of a period
    pub fn downloads(&self, period: &str) -> PathBuf {
        self.root.join(DOWNLOADS_DIR).join(period)
    }

    /// Stacked multi-band rasters of a period
    pub fn stacked(&self, period: &str) -> PathBuf {
        self.root.join(STACKED_DIR).join(period)
    }

    /// Clipped rasters and the mosaic of a period
    pub fn clipped(&self, period: &str) -> PathBuf {
        self.root.join(CLIPPED_DIR).join(period)
    }

    /// Resolve a path given relative to the root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Create the output directories of every period
    pub fn bootstrap(&self, periods: &[String]) -> Result<()> {
        for period in periods {
            for dir in [self.stacked(period), self.clipped(period)] {
                debug!("Ensuring directory {}", dir.display());
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

/// Directory entries sorted by file name, skipping hidden files and macOS archive debris
pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PreprocessError::MissingInput(format!(
            "directory {}",
            dir.display()
        )));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name.contains("__MACOSX") {
            continue;
        }
        entries.push(path);
    }
    entries.sort();
    Ok(entries)
}

/// True when the extension of `path` equals `ext`, ignoring case
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext.trim_start_matches('.')))
        .unwrap_or(false)
}
