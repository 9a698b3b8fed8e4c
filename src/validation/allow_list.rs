//! Allow-list of local files and directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::file_url::absolutize;

// == Allow List ==
/// Local paths that may be read through `file://` URLs.
///
/// Entries are stored absolute and normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    files: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permits exactly this file.
    pub fn allow_file(&mut self, path: impl AsRef<Path>) {
        self.files.insert(absolutize(path.as_ref()));
    }

    /// Permits this directory and everything beneath it.
    pub fn allow_dir(&mut self, path: impl AsRef<Path>) {
        self.dirs.insert(absolutize(path.as_ref()));
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.files.clear();
        self.dirs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// True if `path` (absolute, normalized) is an allowed file or lies within
    /// an allowed directory.
    ///
    /// Containment compares whole path components: `/tmp/safe` covers
    /// `/tmp/safe` and `/tmp/safe/x`, never `/tmp/safevil/x`.
    pub fn permits(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.iter().any(|dir| path.starts_with(dir))
    }

    /// Like [`permits`](Self::permits), but against the on-disk locations of
    /// the allowed entries.
    ///
    /// `resolved` must already be canonical. Entries that no longer resolve
    /// permit nothing.
    pub fn permits_resolved(&self, resolved: &Path) -> bool {
        let canonical = |entry: &PathBuf| fs::canonicalize(entry).ok();
        self.files.iter().filter_map(canonical).any(|file| file == resolved)
            || self
                .dirs
                .iter()
                .filter_map(canonical)
                .any(|dir| resolved.starts_with(dir))
    }
}
