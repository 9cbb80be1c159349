//! Build-manifest emission through the external `pom2bp` generator.
//!
//! The updater never writes build rules itself. It assembles the generator's
//! argument list from the name mapping and the dependency overrides, runs the
//! generator inside the staging root, and saves whatever it prints.

use crate::config::NameMapping;
use crate::error::{Result, UpdaterError};
use crate::exec::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Guidance shown when the generator is not on `PATH`.
pub const GENERATOR_HINT: &str = "please run lunch to set up build environment. \
     You may also need to run 'm pom2bp' if it hasn't been built already.";

/// Settings forwarded to the manifest generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestOptions {
    /// Program invoked to produce the manifest.
    pub generator: String,
    /// Name of the manifest file written into the staging root.
    pub output_file: String,
    /// SDK version passed as `-sdk-version`.
    pub sdk_version: u32,
    /// Minimum SDK version passed as `-default-min-sdk-version`.
    pub default_min_sdk_version: u32,
    /// Pass `-static-deps` so dependencies link statically.
    pub static_deps: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            generator: "pom2bp".to_owned(),
            output_file: "Android.bp".to_owned(),
            sdk_version: 31,
            default_min_sdk_version: 24,
            static_deps: true,
        }
    }
}

/// Build the generator argument list.
///
/// Rewrites for `group:artifact` keys come first, then bare-artifact keys,
/// then the dependency overrides; each group is sorted so the output is
/// stable across runs. The list always ends with the positional `.`.
///
/// # Examples
///
/// ```
/// use gmaven_updater::config::{NameMapping, NameMappingEntry};
/// use gmaven_updater::manifest::{ManifestOptions, generator_args};
/// use std::collections::BTreeMap;
///
/// let mapping: NameMapping = [(
///     "com.example:widget".to_owned(),
///     NameMappingEntry::for_key("com.example:widget"),
/// )]
/// .into_iter()
/// .collect();
/// let args = generator_args(&mapping, &BTreeMap::new(), &ManifestOptions::default());
/// assert!(args.contains(&"-rewrite=^com.example:widget$=com.example_widget".to_owned()));
/// assert_eq!(args.last().map(String::as_str), Some("."));
/// ```
#[must_use]
pub fn generator_args(
    mapping: &NameMapping,
    overrides: &BTreeMap<String, String>,
    options: &ManifestOptions,
) -> Vec<String> {
    let mut args = vec![
        "-sdk-version".to_owned(),
        options.sdk_version.to_string(),
        "-default-min-sdk-version".to_owned(),
        options.default_min_sdk_version.to_string(),
    ];
    if options.static_deps {
        args.push("-static-deps".to_owned());
    }

    let (qualified, bare): (Vec<_>, Vec<_>) =
        mapping.iter().partition(|(key, _)| key.contains(':'));
    for (key, entry) in qualified.into_iter().chain(bare) {
        args.push(format!("-rewrite=^{key}$={}", entry.name));
    }
    for (key, target) in overrides {
        args.push(format!("-rewrite=^{key}$={target}"));
    }

    for (_, entry) in mapping.iter() {
        if let Some(libs) = &entry.extra_static_libs {
            args.push(format!("-extra-static-libs={}={}", entry.name, sorted_csv(libs)));
        }
    }
    for (_, entry) in mapping.iter() {
        if let Some(libs) = &entry.optional_uses_libs {
            args.push(format!("-optional-uses-libs={}={}", entry.name, sorted_csv(libs)));
        }
    }
    args.extend(
        mapping
            .iter()
            .filter(|(_, entry)| entry.host)
            .map(|(key, _)| format!("-host={key}")),
    );
    args.extend(
        mapping
            .iter()
            .filter(|(_, entry)| entry.host_and_device)
            .map(|(key, _)| format!("-host-and-device={key}")),
    );

    args.push(".".to_owned());
    args
}

fn sorted_csv(values: &[String]) -> String {
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted.join(",")
}

/// Produces manifest text from a prepared staging tree.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestGenerator {
    /// Run the generator in `working_dir` and return its output.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::ExternalTool`] when the generator fails.
    fn generate(&self, working_dir: &Utf8Path, args: &[String]) -> Result<String>;
}

/// Runs the `pom2bp` program through a [`CommandExecutor`].
#[derive(Debug)]
pub struct Pom2BpGenerator<E> {
    program: String,
    executor: E,
}

impl<E: CommandExecutor> Pom2BpGenerator<E> {
    /// Create a generator that invokes `program`.
    #[must_use]
    pub fn new(program: &str, executor: E) -> Self {
        Self {
            program: program.to_owned(),
            executor,
        }
    }
}

impl<E: CommandExecutor> ManifestGenerator for Pom2BpGenerator<E> {
    fn generate(&self, working_dir: &Utf8Path, args: &[String]) -> Result<String> {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!("running {} {} in {working_dir}", self.program, arg_refs.join(" "));

        let output = self
            .executor
            .run(&self.program, &arg_refs, Some(working_dir))?;
        if !output.status.success() {
            return Err(UpdaterError::ExternalTool {
                tool: self.program.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Generate the manifest for `staging_root` and write it there.
///
/// Returns the path of the written manifest.
///
/// # Errors
///
/// Returns an error if the generator fails or the file cannot be written.
pub fn emit_manifest(
    generator: &dyn ManifestGenerator,
    staging_root: &Utf8Path,
    mapping: &NameMapping,
    overrides: &BTreeMap<String, String>,
    options: &ManifestOptions,
) -> Result<Utf8PathBuf> {
    let args = generator_args(mapping, overrides, options);
    let text = generator.generate(staging_root, &args)?;
    let path = staging_root.join(&options.output_file);
    std::fs::write(&path, text)?;
    info!("Wrote {path}");
    Ok(path)
}

/// Locate `program` on `PATH`.
///
/// # Errors
///
/// Returns [`UpdaterError::ExternalToolMissing`] when it cannot be found.
pub fn ensure_generator_available(program: &str) -> Result<Utf8PathBuf> {
    let found = which::which(program).map_err(|_| UpdaterError::ExternalToolMissing {
        tool: program.to_owned(),
        hint: GENERATOR_HINT,
    })?;
    Utf8PathBuf::from_path_buf(found).map_err(|path| UpdaterError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
