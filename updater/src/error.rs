//! Error types for the GMaven updater.
//!
//! This module defines the semantic error variants surfaced at the pipeline
//! boundary. Every variant here is fatal for a run: skipped POM files and
//! unmapped artifacts never reach this type because discovery handles them
//! locally.

use crate::archive::ArchiveError;
use crate::fetch::FetchError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Malformed textual input that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A coordinate string does not have four non-empty colon-separated fields.
    #[error("error in {value} expected: group:library:version:ext")]
    InvalidCoordinate {
        /// The rejected coordinate string.
        value: String,
    },

    /// An artifact payload filename does not match `name-version.(jar|aar)`.
    #[error("artifact filename {file_name} does not match name-version.(jar|aar)")]
    MalformedFileName {
        /// The rejected filename.
        file_name: String,
    },
}

/// Errors that abort an updater run.
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// A coordinate or artifact filename was malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// An artifact archive could not be processed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Retrieving artifacts or version indexes failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    Config {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A required external program is not on `PATH`.
    #[error("cannot find {tool} in path; {hint}")]
    ExternalToolMissing {
        /// Name of the missing program.
        tool: String,
        /// Guidance for making the program available.
        hint: &'static str,
    },

    /// An external program failed or timed out.
    #[error("{tool} failed: {message}")]
    ExternalTool {
        /// Name of the program.
        tool: String,
        /// Description of the failure, usually its stderr.
        message: String,
    },

    /// The working tree has uncommitted changes that must be resolved first.
    #[error(
        "there are uncommitted changes here; please commit or stash before continuing, \
         because the updater will run \"git reset --hard\" if execution fails"
    )]
    VcsState,

    /// A git command failed.
    #[error("git {operation} failed: {message}")]
    Git {
        /// The git operation that failed (diff, commit, reset, ...).
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// Discovery found no mapped artifacts in any repository root.
    #[error("failed to detect artifacts")]
    NoArtifactsResolved,

    /// Failed to build the staging tree or swap it into place.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the staging failure.
        reason: String,
    },

    /// The staging directory exists but is not writable.
    #[error("staging directory {path} is not writable: {reason}")]
    TargetNotWritable {
        /// Path to the non-writable directory.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`UpdaterError`].
pub type Result<T> = std::result::Result<T, UpdaterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinate_names_expected_shape() {
        let err = FormatError::InvalidCoordinate {
            value: "androidx.core:core".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("androidx.core:core"));
        assert!(msg.contains("group:library:version:ext"));
    }

    #[test]
    fn format_error_is_transparent_at_top_level() {
        let err = UpdaterError::from(FormatError::MalformedFileName {
            file_name: "core.aar".to_owned(),
        });
        assert!(err.to_string().starts_with("artifact filename core.aar"));
    }

    #[test]
    fn missing_tool_includes_hint() {
        let err = UpdaterError::ExternalToolMissing {
            tool: "pom2bp".to_owned(),
            hint: "run 'm pom2bp'",
        };
        let msg = err.to_string();
        assert!(msg.contains("pom2bp"));
        assert!(msg.contains("m pom2bp"));
    }

    #[test]
    fn vcs_state_mentions_hard_reset() {
        assert!(UpdaterError::VcsState.to_string().contains("git reset --hard"));
    }

    #[test]
    fn git_error_includes_operation_and_message() {
        let err = UpdaterError::Git {
            operation: "commit",
            message: "nothing to commit".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("commit"));
        assert!(msg.contains("nothing to commit"));
    }
}
