//! Latest-version lookup through GMaven group indexes.
//!
//! Each group publishes `group-index.xml`:
//!
//! ```xml
//! <androidx.core>
//!   <core versions="1.0.0,1.1.0,1.9.0"/>
//!   <core-ktx versions="1.0.0,1.9.0"/>
//! </androidx.core>
//! ```
//!
//! The last entry of `versions` is the latest release.

use super::FetchError;
use super::download::ArtifactDownloader;
use crate::coordinate::ArtifactCoordinate;
use log::info;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Resolves the `latest` version marker.
#[cfg_attr(test, mockall::automock)]
pub trait VersionIndex {
    /// Latest published version of `coordinate`'s library.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnknownArtifact`] if the index does not list the
    /// library, or a download/parse error if the index cannot be read.
    fn latest_version(&self, coordinate: &ArtifactCoordinate) -> Result<String, FetchError>;
}

/// Version index backed by per-group `group-index.xml` files.
///
/// Each group's index is downloaded at most once; the results are kept for
/// the lifetime of the value.
#[derive(Debug)]
pub struct GroupIndex<D> {
    downloader: D,
    base_url: String,
    latest: RefCell<HashMap<String, String>>,
    loaded_groups: RefCell<HashSet<String>>,
}

impl<D: ArtifactDownloader> GroupIndex<D> {
    /// Create an index reading from the repository at `base_url`.
    #[must_use]
    pub fn new(downloader: D, base_url: &str) -> Self {
        Self {
            downloader,
            base_url: base_url.trim_end_matches('/').to_owned(),
            latest: RefCell::new(HashMap::new()),
            loaded_groups: RefCell::new(HashSet::new()),
        }
    }

    fn load_group(&self, coordinate: &ArtifactCoordinate) -> Result<(), FetchError> {
        if self.loaded_groups.borrow().contains(coordinate.group()) {
            return Ok(());
        }

        info!("Fetching latest version for {}", coordinate.key());
        let url = format!("{}/{}/group-index.xml", self.base_url, coordinate.group_path());
        let text = self.downloader.fetch_text(&url)?;
        let entries = parse_group_index(&text)
            .map_err(|reason| FetchError::InvalidIndex { url, reason })?;

        self.latest.borrow_mut().extend(entries);
        self.loaded_groups
            .borrow_mut()
            .insert(coordinate.group().to_owned());
        Ok(())
    }
}

impl<D: ArtifactDownloader> VersionIndex for GroupIndex<D> {
    fn latest_version(&self, coordinate: &ArtifactCoordinate) -> Result<String, FetchError> {
        let key = coordinate.key();
        if let Some(version) = self.latest.borrow().get(&key) {
            return Ok(version.clone());
        }

        self.load_group(coordinate)?;
        self.latest
            .borrow()
            .get(&key)
            .cloned()
            .ok_or(FetchError::UnknownArtifact { key })
    }
}

/// Parse a group index into `(group:library, latest_version)` pairs.
///
/// Children without a `versions` attribute are ignored.
///
/// # Errors
///
/// Returns the parser diagnostic for malformed XML.
///
/// # Examples
///
/// ```
/// use gmaven_updater::fetch::index::parse_group_index;
///
/// let entries = parse_group_index(r#"<a.b><c versions="1.0.0,1.1.0"/></a.b>"#)
///     .expect("valid index");
/// assert_eq!(entries, vec![("a.b:c".to_owned(), "1.1.0".to_owned())]);
/// ```
pub fn parse_group_index(xml: &str) -> Result<Vec<(String, String)>, String> {
    let document = roxmltree::Document::parse(xml).map_err(|e| e.to_string())?;
    let group = document.root_element().tag_name().name();

    Ok(document
        .root_element()
        .children()
        .filter(roxmltree::Node::is_element)
        .filter_map(|library| {
            let latest = library.attribute("versions")?.split(',').next_back()?.trim();
            Some((
                format!("{group}:{}", library.tag_name().name()),
                latest.to_owned(),
            ))
        })
        .collect())
}
