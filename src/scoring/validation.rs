use super::config::{ScoringConfig, SCORE_MAX, SCORE_MIN};

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(threshold) = config.threshold {
        if !threshold.is_finite() {
            errors.push("scoring.threshold: must be a finite number".to_string());
        } else if threshold < SCORE_MIN as f64 || threshold > SCORE_MAX as f64 {
            errors.push(format!(
                "scoring.threshold: {} is outside the answer scale {}-{}",
                threshold, SCORE_MIN, SCORE_MAX
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
