pub mod config;
pub mod medium;
pub mod session;
pub mod types;

pub use config::{validate_storage, StorageConfig, StoragePolicy};
pub use medium::{CacheStore, KeyValueStore, MemoryStore};
pub use session::{SessionStore, SCHEMA_VERSION};
pub use types::{HistoryEntry, LeadershipSummary, Preferences, SessionRecord, StorageInfo};

use anyhow::Result;
use thiserror::Error;

/// Failures of a storage medium. [`SessionStore`] absorbs these; they only
/// surface when a medium is used directly.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt entry: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache error: {0}")]
    Cache(#[from] cacache::Error),
}

/// Open the on-disk session store described by `config`
pub fn open_disk_store(config: &StorageConfig) -> Result<SessionStore<CacheStore>> {
    let policy = config.policy()?;
    let medium = CacheStore::with_quota(config.store_dir(), config.quota_bytes);
    tracing::debug!("Opening store at {}", medium.path().display());
    Ok(SessionStore::new(medium, policy))
}
