//! Versioned Maven artifact coordinates.
//!
//! A coordinate is written `group:library:version:extension`, for example
//! `androidx.core:core:1.9.0:aar`. The version may be the sentinel `latest`,
//! which the fetch step resolves against the remote group index before any
//! download happens.

use crate::error::FormatError;
use std::fmt;
use std::str::FromStr;

/// Base URL of Google's Maven repository.
pub const GMAVEN_BASE_URL: &str = "https://dl.google.com/dl/android/maven2";

/// Version marker requesting the newest published version.
pub const LATEST_VERSION: &str = "latest";

/// An immutable `group:library:version:extension` coordinate.
///
/// # Examples
///
/// ```
/// use gmaven_updater::coordinate::ArtifactCoordinate;
///
/// let coordinate = ArtifactCoordinate::parse("androidx.core:core:1.9.0:aar")
///     .expect("valid coordinate");
/// assert_eq!(coordinate.key(), "androidx.core:core");
/// assert_eq!(coordinate.group_path(), "androidx/core");
/// assert_eq!(
///     coordinate.artifact_url("https://maven.example"),
///     "https://maven.example/androidx/core/core/1.9.0/core-1.9.0.aar"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    group: String,
    library: String,
    version: String,
    extension: String,
}

impl ArtifactCoordinate {
    /// Parse a four-field coordinate string.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidCoordinate`] when the string does not
    /// split into exactly four colon-separated fields or any field is empty.
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        let invalid = || FormatError::InvalidCoordinate {
            value: spec.to_owned(),
        };
        let fields: Vec<&str> = spec.split(':').collect();
        let [group, library, version, extension] = fields.as_slice() else {
            return Err(invalid());
        };
        if [group, library, version, extension]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(invalid());
        }

        Ok(Self {
            group: (*group).to_owned(),
            library: (*library).to_owned(),
            version: (*version).to_owned(),
            extension: (*extension).to_owned(),
        })
    }

    /// Dot-separated group namespace.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Library (artifact id).
    #[must_use]
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Version string, possibly the `latest` sentinel.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Payload extension such as `aar` or `jar`.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns `true` when the version still needs resolving.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.version == LATEST_VERSION
    }

    /// Return a copy of this coordinate pinned to `version`.
    #[must_use]
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            version: version.to_owned(),
            ..self.clone()
        }
    }

    /// Logical key `group:library`, independent of version.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.library)
    }

    /// Group with dots replaced by path separators.
    #[must_use]
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    /// Repository-relative directory holding this version's files.
    #[must_use]
    pub fn relative_dir(&self) -> String {
        format!("{}/{}/{}", self.group_path(), self.library, self.version)
    }

    /// Filename of the POM, `<library>-<version>.pom`.
    #[must_use]
    pub fn pom_file_name(&self) -> String {
        format!("{}-{}.pom", self.library, self.version)
    }

    /// Filename of the binary payload, `<library>-<version>.<ext>`.
    #[must_use]
    pub fn artifact_file_name(&self) -> String {
        format!("{}-{}.{}", self.library, self.version, self.extension)
    }

    /// URL of the POM below `base_url`.
    #[must_use]
    pub fn pom_url(&self, base_url: &str) -> String {
        self.file_url(base_url, &self.pom_file_name())
    }

    /// URL of the binary payload below `base_url`.
    #[must_use]
    pub fn artifact_url(&self, base_url: &str) -> String {
        self.file_url(base_url, &self.artifact_file_name())
    }

    fn file_url(&self, base_url: &str, file_name: &str) -> String {
        format!(
            "{}/{}/{file_name}",
            base_url.trim_end_matches('/'),
            self.relative_dir()
        )
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group, self.library, self.version, self.extension
        )
    }
}
