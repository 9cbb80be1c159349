//! Updater configuration loaded from TOML.
//!
//! The configuration carries the static tables that decide which artifacts
//! are wanted and how they map onto build targets. It is loaded once, never
//! mutated, and passed into the pipeline explicitly.
//!
//! ```toml
//! artifacts = ["androidx.core:core:latest:aar"]
//!
//! [maven_to_make."androidx.core:core"]
//! name = "androidx.core_core"
//! extra-static-libs = ["androidx-annotation"]
//! ```

use crate::coordinate::{ArtifactCoordinate, GMAVEN_BASE_URL};
use crate::error::{FormatError, Result, UpdaterError};
use crate::manifest::ManifestOptions;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Default destination directory, relative to the working directory.
pub const DEFAULT_DESTINATION: &str = "gmaven";

/// Returns the build target name for an unversioned coordinate.
///
/// # Examples
///
/// ```
/// use gmaven_updater::config::name_for_artifact;
///
/// assert_eq!(name_for_artifact("androidx.core:core"), "androidx.core_core");
/// ```
#[must_use]
pub fn name_for_artifact(group_artifact: &str) -> String {
    group_artifact.replace(':', "_")
}

/// Returns the build path for an unversioned coordinate.
///
/// # Examples
///
/// ```
/// use gmaven_updater::config::path_for_artifact;
///
/// assert_eq!(path_for_artifact("androidx.core:core"), "androidx/core/core");
/// ```
#[must_use]
pub fn path_for_artifact(group_artifact: &str) -> String {
    group_artifact.replace(['.', ':'], "/")
}

/// Mapping entry as written in the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MappingEntrySpec {
    name: Option<String>,
    path: Option<String>,
    #[serde(rename = "extra-static-libs")]
    extra_static_libs: Option<Vec<String>>,
    #[serde(rename = "optional-uses-libs")]
    optional_uses_libs: Option<Vec<String>>,
    host: bool,
    host_and_device: bool,
}

/// How one Maven artifact maps onto a build target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMappingEntry {
    /// Build target name.
    pub name: String,
    /// Build path, relative to the destination root.
    pub path: String,
    /// Extra static libraries linked into the target, when declared.
    pub extra_static_libs: Option<Vec<String>>,
    /// Optional `uses-library` entries, when declared.
    pub optional_uses_libs: Option<Vec<String>>,
    /// Build the target for the host only.
    pub host: bool,
    /// Build the target for both host and device.
    pub host_and_device: bool,
}

impl NameMappingEntry {
    /// Create an entry with the derived default name and path for `key`.
    #[must_use]
    pub fn for_key(key: &str) -> Self {
        Self {
            name: name_for_artifact(key),
            path: path_for_artifact(key),
            extra_static_libs: None,
            optional_uses_libs: None,
            host: false,
            host_and_device: false,
        }
    }

    fn from_spec(key: &str, spec: MappingEntrySpec) -> Self {
        Self {
            name: spec.name.unwrap_or_else(|| name_for_artifact(key)),
            path: spec.path.unwrap_or_else(|| path_for_artifact(key)),
            extra_static_libs: spec.extra_static_libs,
            optional_uses_libs: spec.optional_uses_libs,
            host: spec.host,
            host_and_device: spec.host_and_device,
        }
    }
}

/// Table of wanted artifacts keyed by `group:artifact` or bare `artifact`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMapping {
    entries: BTreeMap<String, NameMappingEntry>,
}

impl<'de> Deserialize<'de> for NameMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let specs = BTreeMap::<String, MappingEntrySpec>::deserialize(deserializer)?;
        Ok(specs
            .into_iter()
            .map(|(key, spec)| {
                let entry = NameMappingEntry::from_spec(&key, spec);
                (key, entry)
            })
            .collect())
    }
}

impl FromIterator<(String, NameMappingEntry)> for NameMapping {
    fn from_iter<I: IntoIterator<Item = (String, NameMappingEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl NameMapping {
    /// Look up the entry for a mapping key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&NameMappingEntry> {
        self.entries.get(key)
    }

    /// Resolve a discovered artifact to its mapping key.
    ///
    /// The full `group:artifact` key wins over a bare `artifact` key. Returns
    /// `None` when the artifact is not wanted.
    #[must_use]
    pub fn resolve_key(&self, group_id: &str, artifact_id: &str) -> Option<&str> {
        let group_artifact = format!("{group_id}:{artifact_id}");
        self.entries
            .get_key_value(group_artifact.as_str())
            .or_else(|| self.entries.get_key_value(artifact_id))
            .map(|(key, _)| key.as_str())
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NameMappingEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of mapped keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Files always removed from extracted archive contents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Denylist(Vec<Utf8PathBuf>);

impl Denylist {
    /// Create a denylist from relative paths.
    #[must_use]
    pub fn new(paths: Vec<Utf8PathBuf>) -> Self {
        Self(paths)
    }

    /// Iterate the denylisted relative paths.
    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.0.iter().map(Utf8PathBuf::as_path)
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self(
            [
                "annotations.zip",
                "public.txt",
                "R.txt",
                "AndroidManifest.xml",
                "libs/noto-emoji-compat-java.jar",
            ]
            .into_iter()
            .map(Utf8PathBuf::from)
            .collect(),
        )
    }
}

/// Default mapping of POM dependency names to existing build targets.
#[must_use]
pub fn default_deps_rewrite() -> BTreeMap<String, String> {
    [
        ("auto-common", "auto_common"),
        ("auto-value-annotations", "auto_value_annotations"),
        ("com.google.auto.value:auto-value", "libauto_value_plugin"),
        ("monitor", "androidx.test.monitor"),
        ("rules", "androidx.test.rules"),
        ("runner", "androidx.test.runner"),
        ("androidx.test:core", "androidx.test.core"),
        ("com.squareup:javapoet", "javapoet"),
        (
            "com.google.guava:listenablefuture",
            "guava-listenablefuture-prebuilt-jar",
        ),
        ("sqlite-jdbc", "xerial-sqlite-jdbc"),
        ("gson", "gson-prebuilt-jar"),
        ("com.intellij:annotations", "jetbrains-annotations"),
        (
            "javax.annotation:javax.annotation-api",
            "javax-annotation-api-prebuilt-host-jar",
        ),
        ("org.robolectric:robolectric", "Robolectric_all-target"),
        ("org.jetbrains.kotlin:kotlin-stdlib-common", "kotlin-stdlib"),
        (
            "org.jetbrains.kotlinx:kotlinx-coroutines-core",
            "kotlinx_coroutines",
        ),
        (
            "org.jetbrains.kotlinx:kotlinx-coroutines-android",
            "kotlinx_coroutines_android",
        ),
        (
            "org.jetbrains.kotlinx:kotlinx-metadata-jvm",
            "kotlinx_metadata_jvm",
        ),
    ]
    .into_iter()
    .map(|(key, target)| (key.to_owned(), target.to_owned()))
    .collect()
}

/// Complete updater configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdaterConfig {
    /// Remote Maven repository base URL.
    pub base_url: String,
    /// Directory replaced by the transformed artifact tree.
    pub destination: Utf8PathBuf,
    /// Local repository that downloads land in; defaults to `destination`.
    pub download_root: Option<Utf8PathBuf>,
    /// Extract AAR resources into each artifact's build path.
    pub extract_resources: bool,
    /// Coordinates to fetch, as `group:library:version:ext` strings.
    pub artifacts: Vec<String>,
    /// Wanted artifacts and their build targets.
    pub maven_to_make: NameMapping,
    /// Dependency-name overrides applied after the mapping rewrites.
    pub deps_rewrite: BTreeMap<String, String>,
    /// Files removed from extracted archives.
    pub denylist: Denylist,
    /// Options forwarded to the manifest generator.
    pub manifest: ManifestOptions,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            base_url: GMAVEN_BASE_URL.to_owned(),
            destination: Utf8PathBuf::from(DEFAULT_DESTINATION),
            download_root: None,
            extract_resources: false,
            artifacts: Vec::new(),
            maven_to_make: NameMapping::default(),
            deps_rewrite: default_deps_rewrite(),
            denylist: Denylist::default(),
            manifest: ManifestOptions::default(),
        }
    }
}

impl UpdaterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| UpdaterError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&contents).map_err(|reason| UpdaterError::Config {
            path: path.to_owned(),
            reason,
        })
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the parser's diagnostic when the text is not a valid
    /// configuration.
    pub fn from_toml(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Directory downloads are written to.
    #[must_use]
    pub fn download_root(&self) -> &Utf8Path {
        self.download_root.as_deref().unwrap_or(&self.destination)
    }

    /// Parse the configured artifact coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidCoordinate`] for the first malformed
    /// entry.
    pub fn coordinates(&self) -> std::result::Result<Vec<ArtifactCoordinate>, FormatError> {
        self.artifacts
            .iter()
            .map(|spec| ArtifactCoordinate::parse(spec))
            .collect()
    }
}
