use crate::error::Result;
use crate::layout::{has_extension, sorted_entries};
use log::{debug, info};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Archive unpacked, with the number of entries written
    Extracted(usize),
    /// Product directory already present, archive left untouched
    AlreadyPresent(PathBuf),
}

/// Zip archives of a period folder, sorted by name
pub fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && has_extension(p, "zip"))
        .collect())
}

/// Directory a product archive unpacks to, if it already exists
fn existing_product_dir(archive: &Path) -> Option<PathBuf> {
    let parent = archive.parent()?;
    let stem = archive.file_stem()?.to_string_lossy().into_owned();
    [parent.join(&stem), parent.join(format!("{}.SAFE", stem))]
        .into_iter()
        .find(|p| p.is_dir())
}

/// Unpack `archive` next to itself.
///
/// Entries are written to a hidden staging directory beside the archive and
/// moved into place only once every entry has been read back intact, so a
/// failed extraction never leaves a product directory behind. Entries that
/// would land outside the destination are rejected by the zip reader.
pub fn extract_archive(archive: &Path) -> Result<Extraction> {
    if let Some(dir) = existing_product_dir(archive) {
        debug!(
            "Skipping {}, {} already extracted",
            archive.display(),
            dir.display()
        );
        return Ok(Extraction::AlreadyPresent(dir));
    }

    let dest = archive.parent().unwrap_or_else(|| Path::new("."));
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let reader = BufReader::new(File::open(archive)?);
    let mut zip = ZipArchive::new(reader)?;
    let entries = zip.len();

    // removed on drop, whichever way this returns
    let staging = tempfile::Builder::new()
        .prefix(&format!(".{}.", stem))
        .suffix(".partial")
        .tempdir_in(dest)?;
    zip.extract(staging.path())?;

    for entry in fs::read_dir(staging.path())? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        } else if target.exists() {
            fs::remove_file(&target)?;
        }
        fs::rename(entry.path(), &target)?;
    }

    info!("Unzipped product {} ({} entries)", stem, entries);
    Ok(Extraction::Extracted(entries))
}
