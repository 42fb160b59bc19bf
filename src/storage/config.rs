use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SESSION_TTL: &str = "24h";
pub const DEFAULT_HISTORY_LIMIT: usize = 3;
pub const DEFAULT_HISTORY_EXPIRY: &str = "30days";

/// Persistence configuration.
///
/// Example YAML:
/// ```yaml
/// storage:
///   session_ttl: 24h
///   history_limit: 3
///   history_expiry: 30days
///   quota_bytes: 5242880
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Store directory (default: platform data dir)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// In-progress sessions older than this are discarded (default: 24h)
    #[serde(default)]
    pub session_ttl: Option<String>,

    /// Number of past results kept (default: 3)
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Lifetime of each past result (default: 30days)
    #[serde(default)]
    pub history_expiry: Option<String>,

    /// Byte budget for the store; writes beyond it fail
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

/// Resolved persistence limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoragePolicy {
    pub session_ttl: Duration,
    pub history_limit: usize,
    pub history_expiry: Duration,
}

impl Default for StoragePolicy {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_expiry: Duration::days(30),
        }
    }
}

impl StorageConfig {
    pub fn policy(&self) -> Result<StoragePolicy> {
        let session_ttl = parse_duration(
            self.session_ttl.as_deref().unwrap_or(DEFAULT_SESSION_TTL),
        )
        .context("storage.session_ttl")?;
        let history_expiry = parse_duration(
            self.history_expiry.as_deref().unwrap_or(DEFAULT_HISTORY_EXPIRY),
        )
        .context("storage.history_expiry")?;

        Ok(StoragePolicy {
            session_ttl,
            history_limit: self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            history_expiry,
        })
    }

    /// Directory of the on-disk store (~/.local/share/lead-type/store on Linux)
    pub fn store_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_store_dir)
    }
}

pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("lead-type/store"))
        .unwrap_or_else(|| crate::config::get_config_dir().join("store"))
}

fn parse_duration(s: &str) -> Result<Duration> {
    let std = humantime::parse_duration(s.trim())?;
    if std.is_zero() {
        bail!("duration must be greater than zero");
    }
    let duration = Duration::from_std(std).context("duration out of range")?;
    if Utc::now().checked_add_signed(duration).is_none() {
        bail!("duration reaches past the latest representable date");
    }
    Ok(duration)
}

/// Validate storage configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_storage(config: &StorageConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref ttl) = config.session_ttl {
        if let Err(e) = parse_duration(ttl) {
            errors.push(format!("storage.session_ttl: invalid '{}' - {}", ttl, e));
        }
    }

    if let Some(ref expiry) = config.history_expiry {
        if let Err(e) = parse_duration(expiry) {
            errors.push(format!("storage.history_expiry: invalid '{}' - {}", expiry, e));
        }
    }

    if config.history_limit == Some(0) {
        errors.push("storage.history_limit: must be at least 1".to_string());
    }

    if config.quota_bytes == Some(0) {
        errors.push("storage.quota_bytes: must be greater than zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
