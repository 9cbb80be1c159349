//! Per-artifact transformation into the staging tree.
//!
//! The artifact's version directory moves into staging at the same relative
//! path it had in its repository. AAR payloads additionally contribute their
//! `AndroidManifest.xml` to `manifests/<target name>/` and, when resources
//! are requested, their extracted contents to the target's build path.

use super::cleanup::{prune_empty_dirs, remove_classes_jar, remove_denylisted};
use super::extraction::ArchiveExtractor;
use super::filename::{ArtifactFileName, PayloadKind};
use crate::config::{Denylist, NameMappingEntry};
use crate::discovery::ResolvedArtifact;
use crate::error::Result;
use crate::stager::Stager;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};

/// Directory in the staging root collecting per-target manifests.
pub const MANIFESTS_DIR: &str = "manifests";

/// Manifest entry extracted from every AAR.
pub const ANDROID_MANIFEST: &str = "AndroidManifest.xml";

/// Per-run transformation settings.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions<'a> {
    /// Extract AAR contents into the target's build path.
    pub extract_resources: bool,
    /// Files removed after extraction.
    pub denylist: &'a Denylist,
}

/// Outcome of transforming one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedArtifact {
    /// Mapping key of the artifact.
    pub key: String,
    /// Build target name.
    pub target_name: String,
    /// Version parsed from the payload filename.
    pub version: String,
    /// Payload format.
    pub kind: PayloadKind,
    /// Payload location inside the staging tree.
    pub payload: Utf8PathBuf,
    /// Extracted manifest descriptor, for AAR payloads.
    pub manifest: Option<Utf8PathBuf>,
}

/// Move `artifact` into staging and process its payload.
///
/// # Errors
///
/// Returns an error if the payload filename is malformed, the directory
/// cannot be relocated, or the archive cannot be processed. A missing
/// `AndroidManifest.xml` in an AAR is fatal.
pub fn transform_artifact(
    artifact: ResolvedArtifact,
    entry: &NameMappingEntry,
    stager: &Stager,
    options: &TransformOptions<'_>,
    extractor: &dyn ArchiveExtractor,
) -> Result<TransformedArtifact> {
    let file_name = ArtifactFileName::parse(&artifact.file)?;
    let new_dir = stager.relocate(&artifact.dir, artifact.relative_dir())?;
    let payload = new_dir.join(&artifact.file);
    info!("Staged {} {} as {}", artifact.key, file_name.version(), entry.name);

    let manifest = match file_name.kind() {
        PayloadKind::Aar => {
            if options.extract_resources {
                let target_dir = stager.staging_path().join(&entry.path);
                extract_resources(extractor, &payload, &target_dir, options.denylist)?;
            }
            let manifest_dir = stager
                .staging_path()
                .join(MANIFESTS_DIR)
                .join(&entry.name);
            Some(extractor.extract_entry(&payload, ANDROID_MANIFEST, &manifest_dir)?)
        }
        PayloadKind::Jar => None,
    };

    Ok(TransformedArtifact {
        key: artifact.key,
        target_name: entry.name.clone(),
        version: file_name.version().to_owned(),
        kind: file_name.kind(),
        payload,
        manifest,
    })
}

fn extract_resources(
    extractor: &dyn ArchiveExtractor,
    payload: &Utf8Path,
    target_dir: &Utf8Path,
    denylist: &Denylist,
) -> Result<()> {
    std::fs::create_dir_all(target_dir)?;
    let files = extractor.extract_all(payload, target_dir)?;
    debug!("extracted {} files into {target_dir}", files.len());

    remove_classes_jar(target_dir)?;
    remove_denylisted(target_dir, denylist)?;
    prune_empty_dirs(target_dir)?;
    Ok(())
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
