//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, PREFERENCES_FILE_NAME,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for subtrack clients.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// Bearer token handed over by the identity provider, if already known.
    pub token: Option<String>,
    pub request_timeout: Duration,
    pub page_size: usize,
    pub preferences_path: PathBuf,
}

fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    for key in ["HOME", "USERPROFILE"] {
        if let Ok(home) = env::var(key) {
            if !home.trim().is_empty() {
                return Some(PathBuf::from(home));
            }
        }
    }
    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off`, empty.
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Parse a page size, rejecting zero and garbage.
pub(crate) fn parse_page_size(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|size| *size >= 1)
}

/// Default location of the JSON preference file.
pub fn default_preferences_path() -> PathBuf {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config")
        .join("subtrack")
        .join(PREFERENCES_FILE_NAME)
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparsable.
    pub fn from_env() -> Self {
        Self {
            api_url: non_empty_env("SUBTRACK_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: non_empty_env("SUBTRACK_TOKEN"),
            request_timeout: Duration::from_secs(
                env::var("SUBTRACK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            page_size: env::var("SUBTRACK_PAGE_SIZE")
                .ok()
                .and_then(|s| parse_page_size(&s))
                .unwrap_or(DEFAULT_PAGE_SIZE),
            preferences_path: non_empty_env("SUBTRACK_PREFS_PATH")
                .map(|path| PathBuf::from(expand_tilde(path)))
                .unwrap_or_else(default_preferences_path),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            preferences_path: default_preferences_path(),
        }
    }
}
