use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::StorageError;

/// String key-value persistence, the equivalent of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store with an optional byte quota.
///
/// `MemoryStore::unavailable()` fails every operation, standing in for a
/// disabled storage medium.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map(|v| v.len()).unwrap_or(0);
            let needed = self.used_bytes() - replaced + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.remove(key);
        Ok(())
    }
}

/// On-disk store backed by a cacache directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    quota: Option<usize>,
}

impl CacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path, quota: None }
    }

    pub fn with_quota(path: PathBuf, quota: Option<usize>) -> Self {
        Self { path, quota }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes held by live entries, excluding `skip_key`
    fn used_bytes_except(&self, skip_key: &str) -> Result<usize, StorageError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let mut total = 0;
        for entry in cacache::list_sync(&self.path) {
            let entry = entry?;
            if entry.key != skip_key {
                total += entry.size;
            }
        }
        Ok(total)
    }
}

impl CacheStore {
    /// Drop the index bucket and content blob behind `key`. Content still
    /// referenced by another key only loses this key's index entry.
    fn drop_entry(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        let Some(current) = cacache::metadata_sync(&self.path, key)? else {
            return Ok(());
        };

        let mut shared = false;
        for entry in cacache::list_sync(&self.path) {
            let entry = entry?;
            if entry.key != key && entry.integrity == current.integrity {
                shared = true;
                break;
            }
        }

        let result = if shared {
            cacache::remove_sync(&self.path, key)
        } else {
            cacache::RemoveOpts::new()
                .remove_fully(true)
                .remove_sync(&self.path, key)
        };

        match result {
            Ok(()) | Err(cacache::Error::EntryNotFound(..)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for CacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match cacache::read_sync(&self.path, key) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StorageError::Corrupt(format!("{}: {}", key, e))),
            Err(cacache::Error::EntryNotFound(..)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the previous value on disk rather than appending to it
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_except(key)? + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.drop_entry(key)?;
        cacache::write_sync(&self.path, key, value.as_bytes())?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.drop_entry(key)
    }
}
