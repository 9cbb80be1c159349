//! Zip extraction with path traversal protection.

use super::ArchiveError;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::io;
use zip::ZipArchive;
use zip::result::ZipError;

/// Trait for extracting payload archives, enabling test mocking.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use gmaven_updater::archive::extraction::{ArchiveExtractor, ZipExtractor};
///
/// let extractor = ZipExtractor;
/// let files = extractor.extract_all(
///     Utf8Path::new("core-1.9.0.aar"),
///     Utf8Path::new("out/androidx/core/core"),
/// )?;
/// assert!(!files.is_empty());
/// # Ok::<(), gmaven_updater::archive::ArchiveError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract every entry of `archive_path` into `dest_dir`.
    ///
    /// Returns the relative paths of the extracted files.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::PathTraversal`] if any entry attempts to
    /// escape `dest_dir`, or an I/O or zip error.
    fn extract_all(
        &self,
        archive_path: &Utf8Path,
        dest_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, ArchiveError>;

    /// Extract the single entry `entry` into `dest_dir`, keeping its
    /// relative path. Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MissingEntry`] if the archive does not
    /// contain `entry`.
    fn extract_entry(
        &self,
        archive_path: &Utf8Path,
        entry: &str,
        dest_dir: &Utf8Path,
    ) -> Result<Utf8PathBuf, ArchiveError>;
}

/// Extractor for zip-based payloads (AAR and JAR).
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract_all(
        &self,
        archive_path: &Utf8Path,
        dest_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, ArchiveError> {
        let mut archive = open(archive_path)?;
        let mut extracted = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let relative = validate_entry_path(entry.name())?;
            let dest_path = dest_dir.join(&relative);

            if entry.is_dir() {
                fs::create_dir_all(&dest_path)?;
                continue;
            }
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&dest_path)?;
            io::copy(&mut entry, &mut out)?;
            extracted.push(relative);
        }

        Ok(extracted)
    }

    fn extract_entry(
        &self,
        archive_path: &Utf8Path,
        entry: &str,
        dest_dir: &Utf8Path,
    ) -> Result<Utf8PathBuf, ArchiveError> {
        let relative = validate_entry_path(entry)?;
        let mut archive = open(archive_path)?;
        let mut file = match archive.by_name(entry) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(ArchiveError::MissingEntry {
                    archive: archive_path.to_owned(),
                    entry: entry.to_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let dest_path = dest_dir.join(relative);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&dest_path)?;
        io::copy(&mut file, &mut out)?;
        Ok(dest_path)
    }
}

fn open(archive_path: &Utf8Path) -> Result<ZipArchive<File>, ArchiveError> {
    let file = File::open(archive_path)?;
    Ok(ZipArchive::new(file)?)
}

/// Validate that an entry name stays inside the destination directory.
fn validate_entry_path(name: &str) -> Result<Utf8PathBuf, ArchiveError> {
    let path = Utf8Path::new(name);
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_)
        )
    });
    if escapes || name.contains('\\') {
        return Err(ArchiveError::PathTraversal {
            path: name.to_owned(),
        });
    }
    Ok(path.to_owned())
}
