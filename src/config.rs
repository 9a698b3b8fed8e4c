//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{
    CacheSettings, CACHE_INACTIVITY_TIMEOUT_MS, CACHE_MAX_LIFETIME_MS, CACHE_MAX_PDF_SIZE_BYTES,
};
use crate::validation::AllowList;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Upstream request timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Idle time before a cached document is evicted, in milliseconds
    pub inactivity_timeout_ms: u64,
    /// Absolute lifetime of a cached document, in milliseconds
    pub max_lifetime_ms: u64,
    /// Largest document body that will be cached
    pub max_pdf_size_bytes: u64,
    /// Directories whose files may be read through file:// URLs
    pub allowed_dirs: Vec<PathBuf>,
    /// Individual files that may be read through file:// URLs
    pub allowed_files: Vec<PathBuf>,
    /// Unused sessions are closed after this many seconds (0 disables the sweep)
    pub session_idle_timeout_secs: u64,
    /// Seconds between idle-session sweeps
    pub session_sweep_interval_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `FETCH_TIMEOUT_SECS` - Upstream request timeout (default: 30)
    /// - `CACHE_INACTIVITY_TIMEOUT_MS` - Idle eviction (default: 10000)
    /// - `CACHE_MAX_LIFETIME_MS` - Absolute eviction (default: 60000)
    /// - `CACHE_MAX_PDF_SIZE_BYTES` - Cacheable size limit (default: 52428800)
    /// - `ALLOWED_DIRS` - Path list of readable directories (default: empty)
    /// - `ALLOWED_FILES` - Path list of readable files (default: empty)
    /// - `SESSION_IDLE_TIMEOUT_SECS` - Idle session lifetime, 0 disables (default: 1800)
    /// - `SESSION_SWEEP_INTERVAL_SECS` - Time between idle sweeps (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.fetch_timeout_secs),
            inactivity_timeout_ms: parse_var("CACHE_INACTIVITY_TIMEOUT_MS")
                .unwrap_or(defaults.inactivity_timeout_ms),
            max_lifetime_ms: parse_var("CACHE_MAX_LIFETIME_MS")
                .unwrap_or(defaults.max_lifetime_ms),
            max_pdf_size_bytes: parse_var("CACHE_MAX_PDF_SIZE_BYTES")
                .unwrap_or(defaults.max_pdf_size_bytes),
            allowed_dirs: path_list("ALLOWED_DIRS"),
            allowed_files: path_list("ALLOWED_FILES"),
            session_idle_timeout_secs: parse_var("SESSION_IDLE_TIMEOUT_SECS")
                .unwrap_or(defaults.session_idle_timeout_secs),
            session_sweep_interval_secs: parse_var("SESSION_SWEEP_INTERVAL_SECS")
                .unwrap_or(defaults.session_sweep_interval_secs),
        }
    }

    /// Eviction and size settings for every session cache.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            inactivity_timeout: Duration::from_millis(self.inactivity_timeout_ms),
            max_lifetime: Duration::from_millis(self.max_lifetime_ms),
            max_pdf_size_bytes: self.max_pdf_size_bytes,
        }
    }

    /// Initial allow-list for local file access.
    pub fn allow_list(&self) -> AllowList {
        let mut allow = AllowList::new();
        for dir in &self.allowed_dirs {
            allow.allow_dir(dir);
        }
        for file in &self.allowed_files {
            allow.allow_file(file);
        }
        allow
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Idle timeout and sweep interval, or `None` when the sweep is disabled.
    pub fn session_sweep(&self) -> Option<(Duration, Duration)> {
        if self.session_idle_timeout_secs == 0 {
            return None;
        }
        Some((
            Duration::from_secs(self.session_idle_timeout_secs),
            Duration::from_secs(self.session_sweep_interval_secs.max(1)),
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            fetch_timeout_secs: 30,
            inactivity_timeout_ms: CACHE_INACTIVITY_TIMEOUT_MS,
            max_lifetime_ms: CACHE_MAX_LIFETIME_MS,
            max_pdf_size_bytes: CACHE_MAX_PDF_SIZE_BYTES,
            allowed_dirs: Vec::new(),
            allowed_files: Vec::new(),
            session_idle_timeout_secs: 1800,
            session_sweep_interval_secs: 60,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn path_list(name: &str) -> Vec<PathBuf> {
    env::var_os(name)
        .map(|value: OsString| {
            env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}
