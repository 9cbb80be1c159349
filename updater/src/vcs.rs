//! Source-control bookkeeping around an update run.
//!
//! The updater refuses to start on a dirty working tree because its cleanup
//! step hard-resets stray files. After a successful run the destination is
//! committed; whatever happens, [`StrayFileCleanup`] discards leftovers such
//! as downloaded payloads when it goes out of scope.

use crate::error::{Result, UpdaterError};
use crate::exec::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use log::{error, info};
use std::process::Output;

const CLEANUP_FAILED: &str = "ERROR: Failed cleaning up, manual cleanup required!!!";

/// Git operations against one working tree.
#[derive(Debug)]
pub struct VcsGuard<E> {
    executor: E,
    repo_dir: Utf8PathBuf,
}

impl<E: CommandExecutor> VcsGuard<E> {
    /// Create a guard for the working tree at `repo_dir`.
    #[must_use]
    pub fn new(executor: E, repo_dir: &Utf8Path) -> Self {
        Self {
            executor,
            repo_dir: repo_dir.to_owned(),
        }
    }

    /// Returns `true` when the index or working tree differs from `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run, or [`UpdaterError::Git`] when
    /// `git diff` fails for another reason than reporting differences, for
    /// example outside a repository.
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        for args in [&["diff", "--quiet"][..], &["diff", "--quiet", "--cached"][..]] {
            let output = self.git_output(args)?;
            match output.status.code() {
                Some(0) => {}
                Some(1) => return Ok(true),
                _ => {
                    return Err(UpdaterError::Git {
                        operation: "diff",
                        message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                    });
                }
            }
        }
        Ok(false)
    }

    /// Fail unless the working tree is clean.
    ///
    /// With `commit_first`, pending tracked changes are committed as
    /// "save working state" before checking again.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::VcsState`] when changes remain, or
    /// [`UpdaterError::Git`] if the save commit fails.
    pub fn ensure_clean(&self, commit_first: bool) -> Result<()> {
        if self.has_uncommitted_changes()? && commit_first {
            info!("Committing pending changes before update");
            self.git("add", &["add", "-u"])?;
            self.git("commit", &["commit", "-m", "save working state"])?;
        }
        if self.has_uncommitted_changes()? {
            return Err(UpdaterError::VcsState);
        }
        Ok(())
    }

    /// Commit the updated destination.
    ///
    /// `keys` name the imported artifacts and `invocation` records the
    /// command line that produced the update. Returns the one-line summary
    /// of the new commit.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Git`] if staging or committing fails.
    pub fn commit_update(
        &self,
        destination: &Utf8Path,
        keys: &[String],
        invocation: &str,
    ) -> Result<String> {
        self.git("add", &["add", destination.as_str()])?;
        let message = commit_message(keys, invocation);
        self.git("commit", &["commit", "-q", "-m", &message])?;
        let summary = self.git("log", &["log", "-1", "--oneline"])?;
        Ok(String::from_utf8_lossy(&summary.stdout).trim().to_owned())
    }

    /// Discard everything not committed, including untracked files.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Git`] at the first failing step.
    pub fn discard_stray_files(&self) -> Result<()> {
        self.git("add", &["add", "-Af", "."])?;
        self.git(
            "commit",
            &["commit", "-m", "COMMIT TO REVERT - RESET ME!!!", "--allow-empty"],
        )?;
        self.git("reset", &["reset", "--hard", "HEAD~1"])?;
        Ok(())
    }

    /// Return a guard that discards stray files when dropped.
    #[must_use]
    pub fn cleanup_guard(&self) -> StrayFileCleanup<'_, E> {
        StrayFileCleanup { vcs: self }
    }

    fn git_output(&self, args: &[&str]) -> Result<Output> {
        self.executor.run("git", args, Some(&self.repo_dir))
    }

    fn git(&self, operation: &'static str, args: &[&str]) -> Result<Output> {
        let output = self.git_output(args)?;
        if !output.status.success() {
            return Err(UpdaterError::Git {
                operation,
                message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(output)
    }
}

/// Scope guard that runs [`VcsGuard::discard_stray_files`] on drop.
#[must_use = "stray files are discarded when the guard is dropped"]
pub struct StrayFileCleanup<'a, E: CommandExecutor> {
    vcs: &'a VcsGuard<E>,
}

impl<E: CommandExecutor> Drop for StrayFileCleanup<'_, E> {
    fn drop(&mut self) {
        if let Err(e) = self.vcs.discard_stray_files() {
            error!("{CLEANUP_FAILED} ({e})");
        }
    }
}

/// Commit message for an import of `keys`.
///
/// # Examples
///
/// ```
/// use gmaven_updater::vcs::commit_message;
///
/// let msg = commit_message(&["androidx.core:core".to_owned()], "update-prebuilts");
/// assert_eq!(msg, "Import androidx.core:core from GMaven\n\nupdate-prebuilts");
/// ```
#[must_use]
pub fn commit_message(keys: &[String], invocation: &str) -> String {
    format!("Import {} from GMaven\n\n{invocation}", keys.join("\n"))
}

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
