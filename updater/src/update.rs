//! The fetch-then-transform update of the destination tree.
//!
//! Downloads land in the configured download root, which by default is the
//! destination itself. The pipeline then rebuilds the destination from that
//! repository, so previously imported artifacts compete with fresh downloads
//! and the newest version of each wins.

use crate::config::UpdaterConfig;
use crate::error::Result;
use crate::fetch::download::ArtifactDownloader;
use crate::fetch::fetch_artifacts;
use crate::fetch::index::VersionIndex;
use crate::manifest::ManifestGenerator;
use crate::pipeline::{Pipeline, PipelineReport};
use log::info;

/// Collaborators used by [`update_gmaven`].
pub struct UpdateServices<'a> {
    /// Resolves `latest` version markers.
    pub index: &'a dyn VersionIndex,
    /// Downloads POMs and payloads.
    pub downloader: &'a dyn ArtifactDownloader,
    /// Produces the build manifest.
    pub generator: &'a dyn ManifestGenerator,
}

/// Outcome of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// `group:library` keys of the requested artifacts, in configuration
    /// order.
    pub requested: Vec<String>,
    /// The pipeline's report on the rebuilt destination.
    pub report: PipelineReport,
}

/// Fetch the configured artifacts and rebuild the destination.
///
/// # Errors
///
/// Returns an error for malformed coordinates, failed lookups or downloads,
/// or any pipeline failure. The destination is only replaced on success.
pub fn update_gmaven(
    config: &UpdaterConfig,
    services: &UpdateServices<'_>,
) -> Result<UpdateSummary> {
    let coordinates = config.coordinates()?;
    let fetched = fetch_artifacts(
        &coordinates,
        services.index,
        services.downloader,
        &config.base_url,
        config.download_root(),
    )?;
    for coordinate in &fetched {
        info!("Fetched {coordinate}");
    }

    let report = Pipeline::new(config, services.generator).run(
        &[config.download_root().to_owned()],
        &config.destination,
        config.extract_resources,
    )?;

    Ok(UpdateSummary {
        requested: fetched.iter().map(|c| c.key()).collect(),
        report,
    })
}
