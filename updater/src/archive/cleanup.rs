//! Removal of build-irrelevant files from extracted payloads.

use crate::config::Denylist;
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::fs;
use std::io;
use walkdir::WalkDir;

/// Name of the compiled-classes jar inside an AAR.
pub const CLASSES_JAR: &str = "classes.jar";

/// Remove `classes.jar` from an extracted AAR. Returns whether it existed.
///
/// # Errors
///
/// Returns any I/O error other than the file being absent.
pub fn remove_classes_jar(target_dir: &Utf8Path) -> io::Result<bool> {
    remove_file_if_present(&target_dir.join(CLASSES_JAR))
}

/// Remove every denylisted file below `target_dir`.
///
/// Denylisted paths that are absent or that name a directory are left
/// alone. Returns the paths that were removed.
///
/// # Errors
///
/// Returns the first I/O error encountered.
pub fn remove_denylisted(
    target_dir: &Utf8Path,
    denylist: &Denylist,
) -> io::Result<Vec<Utf8PathBuf>> {
    let mut removed = Vec::new();
    for relative in denylist.iter() {
        let path = target_dir.join(relative);
        if path.is_file() && remove_file_if_present(&path)? {
            removed.push(path);
        }
    }
    Ok(removed)
}

/// Remove directories below `root` that are empty, deepest first.
///
/// A directory holding only empty directories is removed too. `root` itself
/// is kept. Returns the number of directories removed.
///
/// # Errors
///
/// Returns an I/O error if the tree cannot be walked or a directory cannot
/// be removed.
pub fn prune_empty_dirs(root: &Utf8Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if fs::read_dir(entry.path())?.next().is_none() {
            trace!("removing empty directory {}", entry.path().display());
            fs::remove_dir(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn remove_file_if_present(path: &Utf8Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
