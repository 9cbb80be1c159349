//! Staging tree management and the final destination swap.
//!
//! The transformed tree is assembled in a staging directory next to the
//! destination (`.<name>.staging`) so that replacing the destination is a
//! rename within one filesystem. The swap moves the old destination to a
//! backup name, renames staging into place, then deletes the backup. If the
//! process dies between the two renames the destination is missing and the
//! backup (`.<name>.previous`) holds the old tree.
//!
//! Artifacts already inside the destination are copied into staging rather
//! than moved, so a failed run leaves the destination as it was.

use crate::error::{Result, UpdaterError};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, error, warn};
use std::fs;
use std::io;
use walkdir::WalkDir;

/// Handles the staging directory for one destination.
#[derive(Debug, Clone)]
pub struct Stager {
    destination: Utf8PathBuf,
    staging: Utf8PathBuf,
    backup: Utf8PathBuf,
}

impl Stager {
    /// Create a stager for `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::StagingFailed`] if `destination` has no final
    /// path component.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use gmaven_updater::stager::Stager;
    ///
    /// let stager = Stager::for_destination(Utf8Path::new("prebuilts/gmaven"))?;
    /// assert_eq!(stager.staging_path(), "prebuilts/.gmaven.staging");
    /// # Ok::<(), gmaven_updater::error::UpdaterError>(())
    /// ```
    pub fn for_destination(destination: &Utf8Path) -> Result<Self> {
        let name = destination
            .file_name()
            .ok_or_else(|| UpdaterError::StagingFailed {
                reason: format!("destination {destination} has no directory name"),
            })?;
        let parent = destination.parent().unwrap_or_else(|| Utf8Path::new(""));

        Ok(Self {
            destination: destination.to_owned(),
            staging: parent.join(format!(".{name}.staging")),
            backup: parent.join(format!(".{name}.previous")),
        })
    }

    /// Create a fresh, writable staging directory.
    ///
    /// Leftovers from an interrupted run are removed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or is not writable.
    pub fn prepare(&self) -> Result<()> {
        remove_if_exists(&self.staging).map_err(|e| UpdaterError::StagingFailed {
            reason: format!("failed to clear stale staging directory {}: {e}", self.staging),
        })?;
        fs::create_dir_all(&self.staging)?;

        let test_path = self.staging.join(".gmaven-updater-test");
        match fs::write(&test_path, b"test") {
            Ok(()) => {
                let _ = fs::remove_file(&test_path);
                Ok(())
            }
            Err(e) => Err(UpdaterError::TargetNotWritable {
                path: self.staging.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Move `src_dir` to `relative` inside the staging directory.
    ///
    /// An existing directory at the target is replaced. Directories inside
    /// the destination are copied instead, so the destination stays intact
    /// until [`Stager::swap_into_place`]; the swap discards the originals
    /// along with the old tree. Returns the new location.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::StagingFailed`] if `relative` is empty or not
    /// relative, or if the move fails.
    pub fn relocate(&self, src_dir: &Utf8Path, relative: &Utf8Path) -> Result<Utf8PathBuf> {
        if relative.as_str().is_empty() || relative.is_absolute() {
            return Err(UpdaterError::StagingFailed {
                reason: format!("cannot relocate {src_dir} to staging path '{relative}'"),
            });
        }
        let dest = self.staging.join(relative);
        if lies_within(src_dir, &self.destination) {
            replace_with_copy(src_dir, &dest).map_err(|e| UpdaterError::StagingFailed {
                reason: format!("failed to copy {src_dir} to {dest}: {e}"),
            })?;
            debug!("copied {src_dir} to {dest}");
        } else {
            move_dir(src_dir, &dest).map_err(|e| UpdaterError::StagingFailed {
                reason: format!("failed to move {src_dir} to {dest}: {e}"),
            })?;
            debug!("moved {src_dir} to {dest}");
        }
        Ok(dest)
    }

    /// Replace the destination with the staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::StagingFailed`] if either rename fails. When
    /// the second rename fails the previous destination is restored.
    pub fn swap_into_place(&self) -> Result<()> {
        remove_if_exists(&self.backup)?;

        let had_destination = fs::symlink_metadata(&self.destination).is_ok();
        if had_destination {
            fs::rename(&self.destination, &self.backup).map_err(|e| {
                UpdaterError::StagingFailed {
                    reason: format!("failed to move {} aside: {e}", self.destination),
                }
            })?;
        }

        if let Err(e) = fs::rename(&self.staging, &self.destination) {
            if had_destination {
                if let Err(restore) = fs::rename(&self.backup, &self.destination) {
                    error!(
                        "failed to restore {} from {}: {restore}",
                        self.destination, self.backup
                    );
                }
            }
            return Err(UpdaterError::StagingFailed {
                reason: format!(
                    "failed to move {} to {}: {e}",
                    self.staging, self.destination
                ),
            });
        }

        if had_destination {
            if let Err(e) = remove_if_exists(&self.backup) {
                warn!("failed to remove previous tree {}: {e}", self.backup);
            }
        }
        Ok(())
    }

    /// Return the staging directory.
    #[must_use]
    pub fn staging_path(&self) -> &Utf8Path {
        &self.staging
    }

    /// Return the destination directory.
    #[must_use]
    pub fn destination(&self) -> &Utf8Path {
        &self.destination
    }
}

/// Move a directory tree, replacing `dest` and creating its parents.
///
/// Falls back to copy-then-delete when `src` and `dest` are on different
/// filesystems.
fn move_dir(src: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    remove_if_exists(dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(src, dest) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_tree(src, dest)?;
            fs::remove_dir_all(src)
        }
        other => other,
    }
}

/// Copy a directory tree, replacing `dest` and creating its parents.
fn replace_with_copy(src: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    remove_if_exists(dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    copy_tree(src, dest)
}

/// Whether `path` is `root` or lies below it.
///
/// Paths are compared canonically when both exist, lexically otherwise.
fn lies_within(path: &Utf8Path, root: &Utf8Path) -> bool {
    match (path.canonicalize_utf8(), root.canonicalize_utf8()) {
        (Ok(path), Ok(root)) => path.starts_with(root),
        _ => path.starts_with(root),
    }
}

fn copy_tree(src: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src.as_std_path())
            .map_err(io::Error::other)?;
        let target = dest.as_std_path().join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn remove_if_exists(path: &Utf8Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Workspace {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    impl Workspace {
        fn stager(&self) -> Stager {
            Stager::for_destination(&self.root.join("gmaven")).expect("stager")
        }

        fn write(&self, relative: &str, contents: &str) {
            let path = self.root.join(relative);
            fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
            fs::write(path, contents).expect("write file");
        }
    }

    #[fixture]
    fn workspace() -> Workspace {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8Path::from_path(dir.path())
            .expect("utf8 temp dir")
            .to_owned();
        Workspace { _dir: dir, root }
    }

    #[rstest]
    #[case::nested("a/b/gmaven", "a/b/.gmaven.staging")]
    #[case::bare("gmaven", ".gmaven.staging")]
    fn staging_is_a_sibling(#[case] destination: &str, #[case] expected: &str) {
        let stager = Stager::for_destination(Utf8Path::new(destination)).expect("stager");
        assert_eq!(stager.staging_path(), Utf8Path::new(expected));
        assert_eq!(stager.destination(), Utf8Path::new(destination));
    }

    #[test]
    fn destination_without_name_is_rejected() {
        let err = Stager::for_destination(Utf8Path::new("/")).expect_err("expected rejection");
        assert!(matches!(err, UpdaterError::StagingFailed { .. }));
    }

    #[rstest]
    fn prepare_clears_stale_state(workspace: Workspace) {
        workspace.write(".gmaven.staging/old/file.txt", "stale");
        let stager = workspace.stager();

        stager.prepare().expect("prepare");

        assert!(stager.staging_path().is_dir());
        assert_eq!(
            fs::read_dir(stager.staging_path()).expect("read").count(),
            0
        );
    }

    #[rstest]
    fn relocate_moves_and_replaces(workspace: Workspace) {
        workspace.write("repo/com/example/widget/1.0.0/widget-1.0.0.aar", "new");
        workspace.write(".gmaven.staging/com/example/widget/1.0.0/stale.txt", "old");
        let stager = workspace.stager();

        let dest = stager
            .relocate(
                &workspace.root.join("repo/com/example/widget/1.0.0"),
                Utf8Path::new("com/example/widget/1.0.0"),
            )
            .expect("relocate");

        assert_eq!(dest, stager.staging_path().join("com/example/widget/1.0.0"));
        assert!(dest.join("widget-1.0.0.aar").is_file());
        assert!(!dest.join("stale.txt").exists());
        assert!(!workspace.root.join("repo/com/example/widget/1.0.0").exists());
    }

    #[rstest]
    fn relocate_copies_out_of_the_destination(workspace: Workspace) {
        workspace.write("gmaven/com/example/widget/1.0.0/widget-1.0.0.aar", "prior");
        let stager = workspace.stager();
        stager.prepare().expect("prepare");

        let dest = stager
            .relocate(
                &workspace.root.join("gmaven/com/example/widget/1.0.0"),
                Utf8Path::new("com/example/widget/1.0.0"),
            )
            .expect("relocate");

        assert!(dest.join("widget-1.0.0.aar").is_file());
        assert!(
            workspace
                .root
                .join("gmaven/com/example/widget/1.0.0/widget-1.0.0.aar")
                .is_file()
        );
    }

    #[rstest]
    #[case::nested("gmaven/com/example", true)]
    #[case::same("gmaven", true)]
    #[case::sibling("gmaven-other/com", false)]
    #[case::outside("repo/com/example", false)]
    fn lies_within_compares_path_components(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(
            lies_within(Utf8Path::new(path), Utf8Path::new("gmaven")),
            expected
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::absolute("/abs")]
    fn relocate_rejects_non_relative_targets(workspace: Workspace, #[case] relative: &str) {
        workspace.write("repo/file.txt", "x");
        let err = workspace
            .stager()
            .relocate(&workspace.root.join("repo"), Utf8Path::new(relative))
            .expect_err("expected rejection");
        assert!(matches!(err, UpdaterError::StagingFailed { .. }));
        assert!(workspace.root.join("repo/file.txt").exists());
    }

    #[rstest]
    fn swap_replaces_existing_destination(workspace: Workspace) {
        workspace.write("gmaven/old.txt", "old");
        let stager = workspace.stager();
        stager.prepare().expect("prepare");
        workspace.write(".gmaven.staging/Android.bp", "new");

        stager.swap_into_place().expect("swap");

        assert!(workspace.root.join("gmaven/Android.bp").is_file());
        assert!(!workspace.root.join("gmaven/old.txt").exists());
        assert!(!stager.staging_path().exists());
        assert!(!workspace.root.join(".gmaven.previous").exists());
    }

    #[rstest]
    fn swap_creates_missing_destination(workspace: Workspace) {
        let stager = workspace.stager();
        stager.prepare().expect("prepare");
        workspace.write(".gmaven.staging/Android.bp", "new");

        stager.swap_into_place().expect("swap");

        assert!(workspace.root.join("gmaven/Android.bp").is_file());
    }

    #[rstest]
    fn failed_swap_restores_destination(workspace: Workspace) {
        workspace.write("gmaven/old.txt", "old");
        let stager = workspace.stager();

        let err = stager.swap_into_place().expect_err("no staging directory");

        assert!(matches!(err, UpdaterError::StagingFailed { .. }));
        assert_eq!(
            fs::read_to_string(workspace.root.join("gmaven/old.txt")).expect("read"),
            "old"
        );
    }

    #[rstest]
    fn copy_tree_preserves_layout(workspace: Workspace) {
        workspace.write("src/a/b.txt", "b");
        workspace.write("src/c.txt", "c");

        copy_tree(&workspace.root.join("src"), &workspace.root.join("dst")).expect("copy");

        assert_eq!(
            fs::read_to_string(workspace.root.join("dst/a/b.txt")).expect("read"),
            "b"
        );
        assert!(workspace.root.join("dst/c.txt").is_file());
    }
}
