//! GMaven prebuilts updater library.
//!
//! This crate fetches Android library artifacts from Google's Maven
//! repository, selects the newest version of each mapped artifact across
//! local repositories, lays them out in a prebuilts directory and generates
//! the accompanying build manifest. It is used by the `update-prebuilts`
//! binary and can be driven programmatically with substitute downloaders,
//! generators and command executors.
//!
//! # Modules
//!
//! - [`archive`] - Payload filename parsing, extraction and cleanup
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Name mapping, rewrite and denylist configuration
//! - [`coordinate`] - `group:library:version:ext` artifact coordinates
//! - [`discovery`] - Newest-version selection across local repositories
//! - [`error`] - Semantic error types with recovery hints
//! - [`exec`] - External command execution with timeouts
//! - [`fetch`] - Latest-version lookup and artifact downloads
//! - [`manifest`] - Build manifest generation via `pom2bp`
//! - [`output`] - User-facing stderr messages
//! - [`pipeline`] - Discovery, transformation and swap orchestration
//! - [`pom`] - POM coordinate parsing
//! - [`stager`] - Staging tree and atomic destination replacement
//! - [`update`] - Fetch-then-rebuild entry point
//! - [`vcs`] - Git working-state guard and commit helpers
//! - [`version`] - Maven version ordering

pub mod archive;
pub mod cli;
pub mod config;
pub mod coordinate;
pub mod discovery;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod pom;
pub mod stager;
pub mod update;
pub mod vcs;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
