//! CLI argument definitions for the prebuilts updater.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::LevelFilter;

/// Configuration file read when `--config` is not given, if present.
pub const DEFAULT_CONFIG_FILE: &str = "gmaven.toml";

/// Update current prebuilts.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "update-prebuilts")]
#[command(version, about)]
#[command(long_about = concat!(
    "Update current prebuilts.\n\n",
    "Downloads the configured artifacts from Google's Maven repository, keeps ",
    "the newest version of each mapped artifact, regenerates Android.bp with ",
    "pom2bp and commits the result. The working tree must be clean: stray ",
    "files are discarded with \"git reset --hard\" when the run ends.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Update using ./gmaven.toml:\n",
    "    $ update-prebuilts\n\n",
    "  Commit pending changes first:\n",
    "    $ update-prebuilts --commit-first\n\n",
    "  Use another configuration:\n",
    "    $ update-prebuilts --config prebuilts.toml -v",
))]
pub struct Cli {
    /// If uncommitted changes exist, commit them before continuing.
    #[arg(long)]
    pub commit_first: bool,

    /// Configuration file [default: gmaven.toml when present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory to replace, overriding the configuration.
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only report errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Log level implied by `-v`/`-q`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gmaven_updater::cli::Cli;
    /// use log::LevelFilter;
    ///
    /// let cli = Cli { verbosity: 2, ..Cli::default() };
    /// assert_eq!(cli.log_level(), LevelFilter::Trace);
    /// ```
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Configuration file to load, if any.
    ///
    /// An explicit `--config` always wins; otherwise `gmaven.toml` in
    /// `working_dir` is used when it exists.
    #[must_use]
    pub fn config_path(&self, working_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        let default = working_dir.join(DEFAULT_CONFIG_FILE);
        default.is_file().then_some(default)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
