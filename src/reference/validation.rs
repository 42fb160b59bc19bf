use std::collections::HashMap;

use super::ReferenceData;

/// Check loaded reference data for soft defects that construction allows.
/// Returns all problems at once (not just the first).
pub fn validate_reference(data: &ReferenceData) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Question text and factor labels
    let mut factor_owner: HashMap<&str, &str> = HashMap::new();
    for q in &data.questions {
        if q.text.trim().is_empty() {
            errors.push(format!("questions[{}].text: must not be empty", q.id));
        }
        if q.lower_factor.trim().is_empty() {
            errors.push(format!("questions[{}].lower_factor: must not be empty", q.id));
        }
        if let Some(owner) = factor_owner.insert(&q.lower_factor, &q.upper_factor) {
            if owner != q.upper_factor {
                errors.push(format!(
                    "questions[{}].upper_factor: lower factor '{}' is already grouped under '{}'",
                    q.id, q.lower_factor, owner
                ));
            }
        }
    }

    // Typology records
    for (code, record) in data.typology.iter() {
        if record.name.trim().is_empty() {
            errors.push(format!("types.{}.name: must not be empty", code));
        }
    }

    // Compatibility coverage over the shipped taxonomy
    for (code, follower) in data.compatibility.gaps(&data.followers) {
        errors.push(format!(
            "compatibility.{}.{}: missing entry (fallback text will be shown)",
            code, follower
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = include_str!("../../data/types.yaml");
    const FOLLOWERS: &str = include_str!("../../data/followers.yaml");

    #[test]
    fn test_reports_all_errors() {
        let questions = r#"
questions:
  - { id: 1, category: sharing, lower_factor: Openness, upper_factor: Sharing, text: "" }
  - { id: 2, category: interaction, lower_factor: Openness, upper_factor: Interaction, text: "Q2" }
  - { id: 3, category: growth, lower_factor: Coaching, upper_factor: Growth, text: "Q3" }
"#;
        let data = ReferenceData::from_yaml(questions, TYPES, FOLLOWERS).unwrap();
        let errors = validate_reference(&data).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("questions[1].text"));
        assert!(errors[1].contains("already grouped under 'Sharing'"));
    }

    #[test]
    fn test_reports_compatibility_gaps() {
        let followers = r#"
followers:
  - { id: driver, name: Driver }
"#;
        let questions = include_str!("../../data/questions.yaml");
        let data = ReferenceData::from_yaml(questions, TYPES, followers).unwrap();
        let errors = validate_reference(&data).unwrap_err();

        assert_eq!(errors.len(), 8);
        assert!(errors.iter().all(|e| e.starts_with("compatibility.")));
    }
}
