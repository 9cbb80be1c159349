//! Discovery of the newest mapped artifact per key across local repositories.
//!
//! Every `*.pom` below each repository root is a candidate. A candidate is
//! kept when its POM declares coordinates, a payload (`.aar`, else `.jar`)
//! sits next to it, and the name mapping wants it. Among candidates sharing a
//! mapping key the highest version wins; on an exact tie the first one seen
//! stays. Roots are walked in the order given and each root in file-name
//! order, so "first seen" is deterministic.

use crate::config::NameMapping;
use crate::error::Result;
use crate::pom::{PomError, PomMetadata};
use crate::version::MavenVersion;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use walkdir::WalkDir;

/// Payload extensions in probing order.
const PAYLOAD_EXTENSIONS: [&str; 2] = ["aar", "jar"];

/// The selected version of one mapped artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Mapping key that selected the artifact.
    pub key: String,
    /// `groupId` from the POM.
    pub group_id: String,
    /// `artifactId` from the POM.
    pub artifact_id: String,
    /// Version from the POM.
    pub version: MavenVersion,
    /// Directory containing the POM and payload.
    pub dir: Utf8PathBuf,
    /// Repository root the artifact was found under.
    pub repo_dir: Utf8PathBuf,
    /// Payload filename inside `dir`.
    pub file: String,
    relative_dir: Utf8PathBuf,
}

impl ResolvedArtifact {
    /// `dir` relative to `repo_dir`.
    #[must_use]
    pub fn relative_dir(&self) -> &Utf8Path {
        &self.relative_dir
    }

    /// Full path of the payload file.
    #[must_use]
    pub fn payload_path(&self) -> Utf8PathBuf {
        self.dir.join(&self.file)
    }
}

/// Walk `repo_dirs` and select the newest wanted artifact per mapping key.
///
/// POMs without usable coordinates are reported with a warning and skipped.
/// POMs without a payload, or whose artifact is not mapped, are skipped
/// silently. Missing roots are skipped with a warning.
///
/// # Errors
///
/// Returns an I/O error if a directory cannot be traversed or a POM cannot
/// be read.
pub fn detect_artifacts(
    repo_dirs: &[Utf8PathBuf],
    mapping: &NameMapping,
) -> Result<BTreeMap<String, ResolvedArtifact>> {
    let mut selected = BTreeMap::new();

    for repo_dir in repo_dirs {
        if !repo_dir.is_dir() {
            warn!("Maven repository {repo_dir} does not exist");
            continue;
        }
        for entry in WalkDir::new(repo_dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(pom_path) = Utf8Path::from_path(entry.path()) else {
                warn!("Skipping non UTF-8 path {}", entry.path().display());
                continue;
            };
            if pom_path.extension() != Some("pom") {
                continue;
            }
            if let Some(candidate) = inspect_pom(repo_dir, pom_path, mapping)? {
                select(&mut selected, candidate);
            }
        }
    }

    Ok(selected)
}

fn inspect_pom(
    repo_dir: &Utf8Path,
    pom_path: &Utf8Path,
    mapping: &NameMapping,
) -> Result<Option<ResolvedArtifact>> {
    let pom = match PomMetadata::read(pom_path) {
        Ok(pom) => pom,
        Err(PomError::Io(e)) => return Err(e.into()),
        Err(e) => {
            warn!("Failed to find Maven artifact data in {pom_path}: {e}");
            return Ok(None);
        }
    };

    let Some(file) = locate_payload(pom_path) else {
        trace!("no payload next to {pom_path}");
        return Ok(None);
    };
    let Some(key) = mapping.resolve_key(&pom.group_id, &pom.artifact_id) else {
        trace!("{} is not mapped", pom.key());
        return Ok(None);
    };
    let Some(dir) = pom_path.parent() else {
        return Ok(None);
    };
    let relative_dir = dir
        .strip_prefix(repo_dir)
        .map(Utf8Path::to_path_buf)
        .unwrap_or_default();

    Ok(Some(ResolvedArtifact {
        key: key.to_owned(),
        version: MavenVersion::new(&pom.version),
        group_id: pom.group_id,
        artifact_id: pom.artifact_id,
        dir: dir.to_path_buf(),
        repo_dir: repo_dir.to_path_buf(),
        file,
        relative_dir,
    }))
}

/// Payload filename next to `pom_path`, preferring an AAR over a JAR.
fn locate_payload(pom_path: &Utf8Path) -> Option<String> {
    PAYLOAD_EXTENSIONS
        .iter()
        .map(|ext| pom_path.with_extension(ext))
        .find(|candidate| candidate.is_file())
        .and_then(|payload| payload.file_name().map(str::to_owned))
}

fn select(selected: &mut BTreeMap<String, ResolvedArtifact>, candidate: ResolvedArtifact) {
    match selected.entry(candidate.key.clone()) {
        Entry::Vacant(slot) => {
            debug!("found {} {}", candidate.key, candidate.version);
            slot.insert(candidate);
        }
        Entry::Occupied(mut slot) => {
            if candidate.version > slot.get().version {
                debug!(
                    "{} {} supersedes {}",
                    candidate.key,
                    candidate.version,
                    slot.get().version
                );
                slot.insert(candidate);
            }
        }
    }
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
