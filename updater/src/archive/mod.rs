//! Transformation of discovered artifacts into the staging layout.
//!
//! # Sub-modules
//!
//! - [`filename`] — Payload filename parsing (`ArtifactFileName`).
//! - [`extraction`] — Zip extraction with path traversal protection.
//! - [`cleanup`] — Removal of build-irrelevant files after extraction.
//! - [`transform`] — Per-artifact relocation and AAR processing.

pub mod cleanup;
pub mod extraction;
pub mod filename;
pub mod transform;

pub use transform::{TransformOptions, TransformedArtifact, transform_artifact};

use camino::Utf8PathBuf;

/// Errors arising from payload archive handling.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error while reading the archive or writing its contents.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive is not a readable zip file.
    #[error("invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry attempts to escape the extraction directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },

    /// A required entry is absent from the archive.
    #[error("{archive} has no entry {entry}")]
    MissingEntry {
        /// The archive that was searched.
        archive: Utf8PathBuf,
        /// The entry that was requested.
        entry: String,
    },
}
