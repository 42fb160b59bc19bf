use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reference::{FollowerSelection, TypeCode};
use crate::scoring::{CategoryScores, ResponseSet};

/// Snapshot of an in-progress (or just completed) assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub current_question_index: usize,
    pub responses: ResponseSet,
    pub is_complete: bool,
}

impl SessionRecord {
    /// True once more than `ttl` has passed since the last checkpoint
    pub fn is_stale_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_updated_at > ttl
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadershipSummary {
    pub code: TypeCode,
    pub name: String,
    pub subtitle: String,
}

/// A finalized result kept in the bounded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub leadership_type: LeadershipSummary,
    pub scores: CategoryScores,
    #[serde(default)]
    pub selected_followers: Vec<FollowerSelection>,
    pub expires_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Remaining lifetime in human-friendly form ("29d left", "5h left", "expired")
    pub fn format_remaining_at(&self, now: DateTime<Utc>) -> String {
        if self.expires_at <= now {
            return "expired".to_string();
        }

        let duration = self.expires_at - now;
        let days = duration.num_days();
        let hours = duration.num_hours();

        if days >= 1 {
            format!("{}d left", days)
        } else if hours >= 1 {
            format!("{}h left", hours)
        } else {
            let minutes = duration.num_minutes();
            if minutes >= 1 {
                format!("{}m left", minutes)
            } else {
                "<1m left".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub has_seen_welcome: bool,
    #[serde(default = "default_language")]
    pub preferred_language: String,
    pub last_visit_at: DateTime<Utc>,
}

fn default_language() -> String {
    "ko".to_string()
}

impl Preferences {
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            has_seen_welcome: false,
            preferred_language: default_language(),
            last_visit_at: now,
        }
    }
}

/// Bytes used by the namespaced keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    pub used_bytes: usize,
}

impl StorageInfo {
    pub fn used_kb(&self) -> f64 {
        self.used_bytes as f64 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(expires_in: Duration) -> HistoryEntry {
        let now = Utc::now();
        HistoryEntry {
            id: Uuid::new_v4(),
            completed_at: now,
            leadership_type: LeadershipSummary {
                code: TypeCode::Hhh,
                name: "Participative Coach".to_string(),
                subtitle: "Transformational Leader".to_string(),
            },
            scores: CategoryScores {
                sharing: 5.0,
                interaction: 5.0,
                growth: 5.0,
            },
            selected_followers: vec![],
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_session_staleness() {
        let now = Utc::now();
        let record = SessionRecord {
            id: Uuid::new_v4(),
            started_at: now - Duration::hours(30),
            last_updated_at: now - Duration::hours(25),
            current_question_index: 3,
            responses: ResponseSet::new(),
            is_complete: false,
        };
        assert!(record.is_stale_at(now, Duration::hours(24)));
        assert!(!record.is_stale_at(now - Duration::hours(2), Duration::hours(24)));
    }

    #[test]
    fn test_history_expiry() {
        let e = entry(Duration::days(30));
        let now = Utc::now();
        assert!(!e.is_expired_at(now));
        assert!(e.is_expired_at(e.expires_at));
        assert!(e.is_expired_at(now + Duration::days(31)));
    }

    #[test]
    fn test_format_remaining() {
        let e = entry(Duration::days(30));
        let at = e.expires_at - Duration::days(3) - Duration::hours(1);
        assert_eq!(e.format_remaining_at(at), "3d left");
        let at = e.expires_at - Duration::hours(5) - Duration::minutes(1);
        assert_eq!(e.format_remaining_at(at), "5h left");
        let at = e.expires_at - Duration::minutes(12);
        assert_eq!(e.format_remaining_at(at), "12m left");
        assert_eq!(e.format_remaining_at(e.expires_at), "expired");
    }

    #[test]
    fn test_preferences_defaults_on_partial_json() {
        let prefs: Preferences =
            serde_json::from_str(r#"{"last_visit_at":"2026-01-01T00:00:00Z"}"#).unwrap();
        assert!(!prefs.has_seen_welcome);
        assert_eq!(prefs.preferred_language, "ko");
    }
}
