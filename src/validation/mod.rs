//! URL Validation Module
//!
//! Decides whether a URL may be read. Remote URLs always pass; `file://`
//! URLs must resolve to an existing path that the allow-list permits.
//! Validation is total: every outcome is a [`ValidationResult`].

mod allow_list;
mod file_url;

use std::fs;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::debug;

use crate::fetch::is_file_url;

pub use allow_list::AllowList;
pub use file_url::{file_url_to_path, path_to_file_url};

// == Validation Result ==
/// Outcome of [`UrlValidator::validate_url`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

// == URL Validator ==
/// Validates URLs against an owned [`AllowList`].
///
/// The allow-list is mutated through the validator (e.g. when a host grants
/// new roots) and read on every validation.
#[derive(Debug, Default)]
pub struct UrlValidator {
    allow_list: RwLock<AllowList>,
}

impl UrlValidator {
    pub fn new(allow_list: AllowList) -> Self {
        Self {
            allow_list: RwLock::new(allow_list),
        }
    }

    /// Permits exactly one file.
    ///
    /// # Arguments
    /// * `path` - File path; relative paths resolve against the current directory
    pub fn allow_file(&self, path: impl AsRef<Path>) {
        self.write().allow_file(path);
    }

    /// Permits a directory and everything beneath it.
    ///
    /// # Arguments
    /// * `path` - Directory path; relative paths resolve against the current directory
    pub fn allow_dir(&self, path: impl AsRef<Path>) {
        self.write().allow_dir(path);
    }

    /// Empties the allow-list.
    pub fn reset(&self) {
        self.write().clear();
    }

    /// Copy of the current allow-list.
    pub fn allow_list(&self) -> AllowList {
        self.read().clone()
    }

    // == Validate ==
    /// Checks whether `url` may be read.
    ///
    /// # Arguments
    /// * `url` - Any URL; only `file:` URLs are checked against the allow-list
    ///
    /// Existence is checked on every call; a file removed after validation
    /// surfaces later as a fetch error. Symlinks are resolved and the real
    /// location must be allowed too.
    pub fn validate_url(&self, url: &str) -> ValidationResult {
        if !is_file_url(url) {
            return ValidationResult::ok();
        }

        let Some(path) = file_url_to_path(url) else {
            return ValidationResult::rejected(format!("Invalid file URL: {}", url));
        };

        if !self.read().permits(&path) {
            debug!("Rejected {}: not in allowed list", path.display());
            return ValidationResult::rejected(format!(
                "Local file not in allowed list: {}",
                path.display()
            ));
        }

        let Ok(resolved) = fs::canonicalize(&path) else {
            return ValidationResult::rejected(format!("File not found: {}", path.display()));
        };

        if !self.read().permits_resolved(&resolved) {
            debug!(
                "Rejected {}: resolves to {} outside the allowed list",
                path.display(),
                resolved.display()
            );
            return ValidationResult::rejected(format!(
                "Local file not in allowed list: {}",
                path.display()
            ));
        }

        ValidationResult::ok()
    }

    fn read(&self) -> RwLockReadGuard<'_, AllowList> {
        self.allow_list.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AllowList> {
        self.allow_list.write().unwrap_or_else(|e| e.into_inner())
    }
}
