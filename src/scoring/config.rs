use serde::{Deserialize, Serialize};

/// Lowest answer on the Likert scale
pub const SCORE_MIN: u8 = 1;
/// Highest answer on the Likert scale
pub const SCORE_MAX: u8 = 6;
/// Category average at or above which an axis classifies as High
pub const DEFAULT_THRESHOLD: f64 = 4.5;

/// Scoring configuration.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   threshold: 4.5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// High/Low cut-off for category averages (default: 4.5).
    /// A category exactly at the threshold is High.
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: Some(DEFAULT_THRESHOLD),
        }
    }
}

impl ScoringConfig {
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }
}

/// Answer labels for the six scale points, lowest first
pub const SCALE_LABELS: [&str; 6] = [
    "Strongly disagree",
    "Disagree",
    "Slightly disagree",
    "Slightly agree",
    "Agree",
    "Strongly agree",
];
