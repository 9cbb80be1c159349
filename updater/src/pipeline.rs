//! Resolution and transformation pipeline orchestration.
//!
//! A run discovers the newest mapped artifacts in the given repositories,
//! moves each into a staging tree next to the destination, emits one build
//! manifest for the whole tree, and finally swaps the staging tree into
//! place. Any failure before the swap leaves the destination untouched.

use crate::archive::extraction::{ArchiveExtractor, ZipExtractor};
use crate::archive::{TransformOptions, TransformedArtifact, transform_artifact};
use crate::config::UpdaterConfig;
use crate::discovery::detect_artifacts;
use crate::error::{Result, UpdaterError};
use crate::manifest::{ManifestGenerator, emit_manifest};
use crate::stager::Stager;
use camino::{Utf8Path, Utf8PathBuf};
use log::{error, info};

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Directory now holding the transformed tree.
    pub destination: Utf8PathBuf,
    /// Transformed artifacts in mapping-key order.
    pub artifacts: Vec<TransformedArtifact>,
    /// Location of the build manifest inside `destination`.
    pub manifest: Utf8PathBuf,
}

impl PipelineReport {
    /// Mapping keys of the transformed artifacts.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.artifacts.iter().map(|a| a.key.clone()).collect()
    }
}

/// Orchestrates discovery, transformation, manifest emission and the swap.
pub struct Pipeline<'a> {
    config: &'a UpdaterConfig,
    generator: &'a dyn ManifestGenerator,
    extractor: &'a dyn ArchiveExtractor,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline extracting payloads with [`ZipExtractor`].
    #[must_use]
    pub fn new(config: &'a UpdaterConfig, generator: &'a dyn ManifestGenerator) -> Self {
        Self {
            config,
            generator,
            extractor: &ZipExtractor,
        }
    }

    /// Replace the archive extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: &'a dyn ArchiveExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Run the pipeline, replacing `destination` on success.
    ///
    /// Winning artifact directories are moved out of `repo_roots` into the
    /// staging tree.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::NoArtifactsResolved`] when discovery finds
    /// nothing, or the first transformation, generator or swap failure.
    pub fn run(
        &self,
        repo_roots: &[Utf8PathBuf],
        destination: &Utf8Path,
        extract_resources: bool,
    ) -> Result<PipelineReport> {
        let mapping = &self.config.maven_to_make;
        let discovered = detect_artifacts(repo_roots, mapping)?;
        if discovered.is_empty() {
            error!("Failed to detect artifacts");
            return Err(UpdaterError::NoArtifactsResolved);
        }
        info!("Selected {} artifact(s)", discovered.len());

        let stager = Stager::for_destination(destination)?;
        stager.prepare()?;

        let options = TransformOptions {
            extract_resources,
            denylist: &self.config.denylist,
        };
        let mut artifacts = Vec::with_capacity(discovered.len());
        for (key, artifact) in discovered {
            let Some(entry) = mapping.get(&key) else {
                continue;
            };
            artifacts.push(transform_artifact(
                artifact,
                entry,
                &stager,
                &options,
                self.extractor,
            )?);
        }

        let staged_manifest = emit_manifest(
            self.generator,
            stager.staging_path(),
            mapping,
            &self.config.deps_rewrite,
            &self.config.manifest,
        )?;
        let manifest = staged_manifest
            .strip_prefix(stager.staging_path())
            .map_or_else(|_| staged_manifest.clone(), |relative| destination.join(relative));

        stager.swap_into_place()?;
        info!("Updated {destination}");

        Ok(PipelineReport {
            destination: destination.to_owned(),
            artifacts: artifacts
                .into_iter()
                .map(|artifact| rebase(artifact, stager.staging_path(), destination))
                .collect(),
            manifest,
        })
    }
}

/// Point staged paths at their post-swap location.
fn rebase(
    mut artifact: TransformedArtifact,
    staging: &Utf8Path,
    destination: &Utf8Path,
) -> TransformedArtifact {
    let move_path = |path: &Utf8Path| {
        path.strip_prefix(staging)
            .map_or_else(|_| path.to_owned(), |relative| destination.join(relative))
    };
    artifact.payload = move_path(&artifact.payload);
    artifact.manifest = artifact.manifest.as_deref().map(move_path);
    artifact
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
