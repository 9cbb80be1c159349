//! Retrieval of configured artifacts into a local Maven repository.
//!
//! # Sub-modules
//!
//! - [`download`] — Download trait and HTTP implementation.
//! - [`index`] — Latest-version resolution via group indexes.

pub mod download;
pub mod index;

use crate::coordinate::ArtifactCoordinate;
use camino::Utf8Path;
use download::{ArtifactDownloader, DownloadError};
use index::VersionIndex;
use log::debug;

/// Errors arising while fetching artifacts.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// A group index could not be parsed.
    #[error("invalid group index at {url}: {reason}")]
    InvalidIndex {
        /// The index URL.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The group index does not list the requested library.
    #[error("no published versions found for {key}")]
    UnknownArtifact {
        /// The `group:library` key that was looked up.
        key: String,
    },

    /// The local download directory could not be created.
    #[error("I/O error preparing download directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve and download every coordinate below `download_root`.
///
/// `latest` markers are resolved through `index` first, so a failed lookup
/// aborts before anything is written. Each artifact's POM and payload land
/// in `<download_root>/<group_path>/<library>/<version>/`. Returns the
/// coordinates pinned to concrete versions, in input order.
///
/// # Errors
///
/// Returns the first lookup, download or I/O failure.
pub fn fetch_artifacts(
    coordinates: &[ArtifactCoordinate],
    index: &dyn VersionIndex,
    downloader: &dyn ArtifactDownloader,
    base_url: &str,
    download_root: &Utf8Path,
) -> Result<Vec<ArtifactCoordinate>, FetchError> {
    let resolved = coordinates
        .iter()
        .map(|coordinate| {
            if coordinate.is_latest() {
                let version = index.latest_version(coordinate)?;
                debug!("resolved {} to {version}", coordinate.key());
                Ok(coordinate.with_version(&version))
            } else {
                Ok(coordinate.clone())
            }
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    for coordinate in &resolved {
        let dir = download_root.join(coordinate.relative_dir());
        std::fs::create_dir_all(&dir)?;
        downloader.fetch_to_file(
            &coordinate.pom_url(base_url),
            &dir.join(coordinate.pom_file_name()),
        )?;
        downloader.fetch_to_file(
            &coordinate.artifact_url(base_url),
            &dir.join(coordinate.artifact_file_name()),
        )?;
    }

    Ok(resolved)
}
