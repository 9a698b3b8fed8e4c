//! Conversions between `file://` URLs and local paths.

use std::path::{Component, Path, PathBuf};

use url::Url;

/// Converts a `file://` URL to an absolute, normalized local path.
///
/// Returns `None` for anything that is not a well-formed file URL.
pub fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    if parsed.scheme() != "file" {
        return None;
    }
    parsed.to_file_path().ok().map(|path| normalize_path(&path))
}

/// Converts a local path to its `file://` URL form.
///
/// Relative paths are resolved against the current directory first.
pub fn path_to_file_url(path: &Path) -> String {
    let absolute = absolutize(path);
    Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|()| format!("file://{}", absolute.display()))
}

/// Makes `path` absolute and resolves `.` and `..` lexically.
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        normalize_path(&base.join(path))
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
