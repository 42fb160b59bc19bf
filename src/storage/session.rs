use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::StoragePolicy;
use super::medium::KeyValueStore;
use super::types::{
    HistoryEntry, LeadershipSummary, Preferences, SessionRecord, StorageInfo,
};
use crate::reference::FollowerSelection;
use crate::scoring::{ResponseSet, TypeResult};

/// Bump whenever the shape of any persisted record changes. A mismatch wipes
/// every namespaced key on the next start.
pub const SCHEMA_VERSION: &str = "1";

pub const CURRENT_SESSION_KEY: &str = "leadtype_currentSession";
pub const RESULTS_HISTORY_KEY: &str = "leadtype_resultsHistory";
pub const PREFERENCES_KEY: &str = "leadtype_preferences";
pub const VERSION_KEY: &str = "leadtype_appVersion";

pub const ALL_KEYS: [&str; 4] = [
    CURRENT_SESSION_KEY,
    RESULTS_HISTORY_KEY,
    PREFERENCES_KEY,
    VERSION_KEY,
];

/// Versioned persistence of the current session, past results and preferences.
///
/// Never returns errors: an unusable medium behaves like an empty one and
/// writes become best-effort.
pub struct SessionStore<S: KeyValueStore> {
    medium: S,
    policy: StoragePolicy,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Open the store, wiping all namespaced keys if the stored schema
    /// version differs from [`SCHEMA_VERSION`].
    pub fn new(medium: S, policy: StoragePolicy) -> Self {
        let mut store = Self { medium, policy };
        store.check_version();
        store
    }

    pub fn policy(&self) -> &StoragePolicy {
        &self.policy
    }

    pub fn medium(&self) -> &S {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut S {
        &mut self.medium
    }

    fn check_version(&mut self) {
        let stored = match self.medium.get(VERSION_KEY) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to read store version: {}", e);
                return;
            }
        };

        if stored.as_deref() == Some(SCHEMA_VERSION) {
            return;
        }

        debug!(
            "Store version changed: {} -> {}, clearing stored data",
            stored.as_deref().unwrap_or("(none)"),
            SCHEMA_VERSION
        );
        self.remove_all();
        if let Err(e) = self.medium.set(VERSION_KEY, SCHEMA_VERSION) {
            warn!("Failed to write store version: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Current session
    // ------------------------------------------------------------------

    /// Save the in-progress assessment, keeping the id of an active session
    pub fn checkpoint(&mut self, responses: &ResponseSet, current_index: usize, is_complete: bool) {
        self.checkpoint_at(responses, current_index, is_complete, Utc::now());
    }

    pub fn checkpoint_at(
        &mut self,
        responses: &ResponseSet,
        current_index: usize,
        is_complete: bool,
        now: DateTime<Utc>,
    ) {
        let existing = self.restore_at(now);
        let session = SessionRecord {
            id: existing.as_ref().map(|s| s.id).unwrap_or_else(Uuid::new_v4),
            started_at: existing.as_ref().map(|s| s.started_at).unwrap_or(now),
            last_updated_at: now,
            current_question_index: current_index,
            responses: responses.clone(),
            is_complete,
        };

        match self.write_json(CURRENT_SESSION_KEY, &session) {
            Ok(()) => debug!("Session saved: {}", session.id),
            Err(e) => {
                warn!("Failed to save session: {}", e);
                // No retry here; the next checkpoint tries again
                self.evict_oldest_result(now);
            }
        }
    }

    /// Load the session unless it is missing, unreadable or stale. A stale
    /// session is deleted.
    pub fn restore(&mut self) -> Option<SessionRecord> {
        self.restore_at(Utc::now())
    }

    pub fn restore_at(&mut self, now: DateTime<Utc>) -> Option<SessionRecord> {
        let session: SessionRecord = self.read_json(CURRENT_SESSION_KEY)?;

        if session.is_stale_at(now, self.policy.session_ttl) {
            debug!("Discarding stale session {}", session.id);
            self.clear();
            return None;
        }

        Some(session)
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.medium.remove(CURRENT_SESSION_KEY) {
            warn!("Failed to clear session: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Results history
    // ------------------------------------------------------------------

    /// Move a completed assessment into the results history.
    ///
    /// Returns the new entry's id, or `None` if it could not be stored.
    pub fn finalize(
        &mut self,
        result: &TypeResult,
        followers: &[FollowerSelection],
    ) -> Option<Uuid> {
        self.finalize_at(result, followers, Utc::now())
    }

    pub fn finalize_at(
        &mut self,
        result: &TypeResult,
        followers: &[FollowerSelection],
        now: DateTime<Utc>,
    ) -> Option<Uuid> {
        let Some(expires_at) = now.checked_add_signed(self.policy.history_expiry) else {
            warn!(
                "Failed to save result: expiry {} out of range",
                self.policy.history_expiry
            );
            return None;
        };

        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            completed_at: now,
            leadership_type: LeadershipSummary {
                code: result.code,
                name: result.record.name.clone(),
                subtitle: result.record.subtitle.clone(),
            },
            scores: result.category_scores,
            selected_followers: followers.to_vec(),
            expires_at,
        };
        let id = entry.id;

        let mut history = self.history_at(now);
        history.insert(0, entry);
        history.truncate(self.policy.history_limit);

        match self.write_json(RESULTS_HISTORY_KEY, &history) {
            Ok(()) => {
                self.clear();
                debug!("Result saved: {}", id);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to save result: {}", e);
                self.evict_oldest_result(now);
                None
            }
        }
    }

    /// Unexpired past results, most recent first. Expired entries are
    /// dropped from the store as a side effect.
    pub fn history(&mut self) -> Vec<HistoryEntry> {
        self.history_at(Utc::now())
    }

    pub fn history_at(&mut self, now: DateTime<Utc>) -> Vec<HistoryEntry> {
        let Some(history) = self.read_json::<Vec<HistoryEntry>>(RESULTS_HISTORY_KEY) else {
            return Vec::new();
        };

        let total = history.len();
        let valid: Vec<HistoryEntry> = history
            .into_iter()
            .filter(|entry| !entry.is_expired_at(now))
            .collect();

        if valid.len() != total {
            debug!("Dropping {} expired results", total - valid.len());
            if let Err(e) = self.write_json(RESULTS_HISTORY_KEY, &valid) {
                warn!("Failed to rewrite results history: {}", e);
            }
        }

        valid
    }

    pub fn get_result(&mut self, id: Uuid) -> Option<HistoryEntry> {
        self.history().into_iter().find(|entry| entry.id == id)
    }

    /// Quota relief: drop the single oldest history entry
    fn evict_oldest_result(&mut self, now: DateTime<Utc>) {
        let mut history = self.history_at(now);
        if let Some(evicted) = history.pop() {
            debug!("Evicting oldest result {} to free space", evicted.id);
            if let Err(e) = self.write_json(RESULTS_HISTORY_KEY, &history) {
                warn!("Failed to evict oldest result: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    pub fn preferences(&self) -> Preferences {
        self.read_json(PREFERENCES_KEY)
            .unwrap_or_else(|| Preferences::default_at(Utc::now()))
    }

    pub fn save_preferences(&mut self, prefs: &Preferences) {
        if let Err(e) = self.write_json(PREFERENCES_KEY, prefs) {
            warn!("Failed to save preferences: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Delete every namespaced key, including the version marker
    pub fn clear_all_data(&mut self) {
        self.remove_all();
        debug!("All stored data cleared");
    }

    pub fn storage_info(&self) -> StorageInfo {
        let used_bytes = ALL_KEYS
            .iter()
            .filter_map(|key| self.medium.get(key).ok().flatten())
            .map(|value| value.len())
            .sum();
        StorageInfo { used_bytes }
    }

    fn remove_all(&mut self) {
        for key in ALL_KEYS {
            if let Err(e) = self.medium.remove(key) {
                warn!("Failed to remove {}: {}", key, e);
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.medium.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse {}: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), super::StorageError> {
        let json = serde_json::to_string(value)?;
        self.medium.set(key, &json)
    }
}
