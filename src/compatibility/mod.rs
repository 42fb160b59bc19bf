pub mod report;

pub use report::{team_report, TeamMemberAnalysis, TeamReport};

use serde::Serialize;
use std::fmt;

use crate::reference::{CompatibilityMatrix, TypeCode};

/// Score used when a (code, follower) pairing has no entry. The fallback
/// level is always `Fair`, independent of this score.
pub const FALLBACK_SCORE: u8 = 50;
const FALLBACK_STRENGTH: &str = "No specific compatibility notes for this pairing.";
const FALLBACK_CAUTION: &str = "Observe how you work together and adjust as you go.";

/// Coarse band for a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompatibilityLevel {
    Excellent,
    Good,
    Fair,
    Caution,
    NeedsWork,
}

impl CompatibilityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            CompatibilityLevel::Excellent
        } else if score >= 80.0 {
            CompatibilityLevel::Good
        } else if score >= 70.0 {
            CompatibilityLevel::Fair
        } else if score >= 60.0 {
            CompatibilityLevel::Caution
        } else {
            CompatibilityLevel::NeedsWork
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompatibilityLevel::Excellent => "Excellent",
            CompatibilityLevel::Good => "Good",
            CompatibilityLevel::Fair => "Fair",
            CompatibilityLevel::Caution => "Caution",
            CompatibilityLevel::NeedsWork => "Needs work",
        }
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compatibility {
    pub score: u8,
    pub strength: String,
    pub caution: String,
    pub level: CompatibilityLevel,
    /// True when no entry existed and generic text was substituted
    pub fallback: bool,
}

/// Look up the pairing of a leadership code with a follower type.
/// Missing pairings resolve to generic text rather than an error.
pub fn analyze(matrix: &CompatibilityMatrix, code: TypeCode, follower_id: &str) -> Compatibility {
    match matrix.get(code, follower_id) {
        Some(entry) => Compatibility {
            score: entry.score,
            strength: entry.strength.clone(),
            caution: entry.caution.clone(),
            level: CompatibilityLevel::from_score(entry.score as f64),
            fallback: false,
        },
        None => {
            tracing::debug!("No compatibility entry for {}/{}", code, follower_id);
            Compatibility {
                score: FALLBACK_SCORE,
                strength: FALLBACK_STRENGTH.to_string(),
                caution: FALLBACK_CAUTION.to_string(),
                level: CompatibilityLevel::Fair,
                fallback: true,
            }
        }
    }
}
