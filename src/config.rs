//! Runtime configuration.
//!
//! The only value that really selects behaviour is the backend base URL; the rest are
//! local concerns (where the session is persisted, how long to wait before re-opening the
//! event stream). Everything can be supplied through the environment:
//!
//! - `OPENPHOTOBOX_API_BASE` (default `http://localhost:8000`)
//! - `OPENPHOTOBOX_SESSION_FILE` (default `<data dir>/openphotobox/session.json`)
//! - `OPENPHOTOBOX_EVENTS_RECONNECT_MS` (default `3000`)

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

const ENV_API_BASE: &str = "OPENPHOTOBOX_API_BASE";
const ENV_SESSION_FILE: &str = "OPENPHOTOBOX_SESSION_FILE";
const ENV_RECONNECT_MS: &str = "OPENPHOTOBOX_EVENTS_RECONNECT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and optional path prefix, no trailing slash.
    pub api_base: String,
    pub session_file: PathBuf,
    pub events_reconnect_delay: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_base: &str) -> ClientResult<Self> {
        Ok(Self {
            api_base: normalize_base(api_base)?,
            session_file: default_session_file(),
            events_reconnect_delay: DEFAULT_RECONNECT_DELAY,
            user_agent: format!("openphotobox/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        let base = std::env::var(ENV_API_BASE).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let mut cfg = Self::new(&base)?;
        if let Ok(p) = std::env::var(ENV_SESSION_FILE) {
            if !p.trim().is_empty() { cfg.session_file = PathBuf::from(p); }
        }
        if let Ok(raw) = std::env::var(ENV_RECONNECT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => cfg.events_reconnect_delay = Duration::from_millis(ms),
                Err(_) => warn!(target: "openphotobox::config", "ignoring {}='{}': not a number of milliseconds", ENV_RECONNECT_MS, raw),
            }
        }
        Ok(cfg)
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.events_reconnect_delay = delay;
        self
    }

    /// Absolute URL for a backend path such as `/api/albums/`.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') { format!("{}{}", self.api_base, path) } else { format!("{}/{}", self.api_base, path) }
    }
}

fn normalize_base(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ClientError::config(format!("invalid API base URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ClientError::config(format!("unsupported API base scheme '{}'", other))),
    }
}

fn default_session_file() -> PathBuf {
    match dirs::data_dir() {
        Some(d) => d.join("openphotobox").join("session.json"),
        None => PathBuf::from(".openphotobox").join("session.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_is_trimmed_and_validated() {
        let cfg = ClientConfig::new("http://photos.local:8000/").unwrap();
        assert_eq!(cfg.api_base, "http://photos.local:8000");
        assert_eq!(cfg.url_for("/api/albums/"), "http://photos.local:8000/api/albums/");
        assert_eq!(cfg.url_for("api/x/"), "http://photos.local:8000/api/x/");
        assert_eq!(cfg.events_reconnect_delay, Duration::from_secs(3));
    }

    #[test]
    fn rejects_garbage_and_foreign_schemes() {
        assert!(matches!(ClientConfig::new("not a url"), Err(ClientError::Config { .. })));
        assert!(matches!(ClientConfig::new("ftp://host"), Err(ClientError::Config { .. })));
    }
}
