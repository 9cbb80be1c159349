//! HTTP retrieval of POMs, payloads and group indexes.
//!
//! Provides a trait-based abstraction over the transport so the fetch
//! orchestration can be tested without network access.

use camino::Utf8Path;
use log::info;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for a single download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Trait for downloading remote files.
///
/// # Examples
///
/// ```no_run
/// use gmaven_updater::fetch::download::{ArtifactDownloader, HttpDownloader};
///
/// let downloader = HttpDownloader;
/// let index = downloader
///     .fetch_text("https://dl.google.com/dl/android/maven2/androidx/core/group-index.xml")?;
/// assert!(index.contains("core"));
/// # Ok::<(), gmaven_updater::fetch::download::DownloadError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactDownloader {
    /// Download `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the resource is not found.
    fn fetch_text(&self, url: &str) -> Result<String, DownloadError>;

    /// Download `url` into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or file write fails. No partial file
    /// is left behind.
    fn fetch_to_file(&self, url: &str, dest: &Utf8Path) -> Result<(), DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl ArtifactDownloader for HttpDownloader {
    fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn fetch_to_file(&self, url: &str, dest: &Utf8Path) -> Result<(), DownloadError> {
        info!("Downloading URL: {url}");
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        if let Err(e) = std::io::copy(&mut response.into_body().as_reader(), &mut file) {
            drop(file);
            let _ = std::fs::remove_file(dest);
            return Err(DownloadError::Io(e));
        }
        Ok(())
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
