pub mod followers;
pub mod question;
pub mod typology;
pub mod validation;

pub use followers::{
    CompatibilityEntry, CompatibilityMatrix, FollowerSelection, FollowerTaxonomy, FollowerType,
};
pub use question::{Category, Question, QuestionSet};
pub use typology::{Level, TypeCode, TypeRecord, TypologyTable};
pub use validation::validate_reference;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

const BUILTIN_QUESTIONS: &str = include_str!("../../data/questions.yaml");
const BUILTIN_TYPES: &str = include_str!("../../data/types.yaml");
const BUILTIN_FOLLOWERS: &str = include_str!("../../data/followers.yaml");

pub const QUESTIONS_FILE: &str = "questions.yaml";
pub const TYPES_FILE: &str = "types.yaml";
pub const FOLLOWERS_FILE: &str = "followers.yaml";

/// Bundled reference files as (file name, contents) pairs
pub fn builtin_files() -> [(&'static str, &'static str); 3] {
    [
        (QUESTIONS_FILE, BUILTIN_QUESTIONS),
        (TYPES_FILE, BUILTIN_TYPES),
        (FOLLOWERS_FILE, BUILTIN_FOLLOWERS),
    ]
}

/// Structural defects in reference data, detected at load time
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("question list is empty")]
    NoQuestions,

    #[error("duplicate question id {0}")]
    DuplicateQuestion(u32),

    #[error("category '{0}' has no questions")]
    EmptyCategory(Category),

    #[error("unknown typology code '{0}'")]
    UnknownTypeCode(String),

    #[error("typology table is missing codes: {}", .0.join(", "))]
    MissingTypeCodes(Vec<String>),

    #[error("duplicate follower type '{0}'")]
    DuplicateFollower(String),

    #[error("unknown follower type '{0}'")]
    UnknownFollower(String),

    #[error("compatibility score {score} for {code}/{follower} exceeds 100")]
    InvalidCompatibilityScore {
        code: TypeCode,
        follower: String,
        score: u8,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionsFile {
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypesFile {
    types: HashMap<String, TypeRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FollowersFile {
    followers: Vec<FollowerType>,
    #[serde(default)]
    compatibility: HashMap<TypeCode, HashMap<String, CompatibilityEntry>>,
}

/// Immutable reference data shared by the scoring engine and the
/// compatibility analysis for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub questions: QuestionSet,
    pub typology: TypologyTable,
    pub followers: FollowerTaxonomy,
    pub compatibility: CompatibilityMatrix,
}

impl ReferenceData {
    /// Reference data bundled with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_QUESTIONS, BUILTIN_TYPES, BUILTIN_FOLLOWERS)
            .context("Bundled reference data is invalid")
    }

    /// Load `questions.yaml`, `types.yaml` and `followers.yaml` from a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<String> {
            let path = dir.join(name);
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read reference file at {}", path.display()))
        };

        let questions = read(QUESTIONS_FILE)?;
        let types = read(TYPES_FILE)?;
        let followers = read(FOLLOWERS_FILE)?;

        Self::from_yaml(&questions, &types, &followers)
            .with_context(|| format!("Invalid reference data in {}", dir.display()))
    }

    pub fn from_yaml(questions: &str, types: &str, followers: &str) -> Result<Self> {
        let questions: QuestionsFile = serde_saphyr::from_str(questions)
            .with_context(|| format!("Failed to parse {}", QUESTIONS_FILE))?;
        let types: TypesFile = serde_saphyr::from_str(types)
            .with_context(|| format!("Failed to parse {}", TYPES_FILE))?;
        let followers: FollowersFile = serde_saphyr::from_str(followers)
            .with_context(|| format!("Failed to parse {}", FOLLOWERS_FILE))?;

        let questions = QuestionSet::new(questions.questions)?;
        let typology = TypologyTable::from_records(types.types)?;
        let taxonomy = FollowerTaxonomy::new(followers.followers)?;
        let compatibility = CompatibilityMatrix::new(followers.compatibility, &taxonomy)?;

        Ok(Self {
            questions,
            typology,
            followers: taxonomy,
            compatibility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_reference_data_loads() {
        let data = ReferenceData::builtin().unwrap();

        assert_eq!(data.questions.len(), 18);
        for category in Category::ALL {
            assert_eq!(data.questions.in_category(category).count(), 6);
        }
        assert_eq!(data.followers.len(), 5);
        assert!(data.compatibility.gaps(&data.followers).is_empty());
        assert_eq!(data.typology.get(TypeCode::Hhh).subtitle, "Transformational Leader");
    }

    #[test]
    fn test_builtin_reference_data_passes_validation() {
        let data = ReferenceData::builtin().unwrap();
        assert!(validate_reference(&data).is_ok());
    }

    #[test]
    fn test_load_dir_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(QUESTIONS_FILE), BUILTIN_QUESTIONS).unwrap();
        fs::write(dir.path().join(TYPES_FILE), BUILTIN_TYPES).unwrap();
        fs::write(dir.path().join(FOLLOWERS_FILE), BUILTIN_FOLLOWERS).unwrap();

        let data = ReferenceData::load_dir(dir.path()).unwrap();
        assert_eq!(data.questions.len(), 18);
    }

    #[test]
    fn test_load_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(QUESTIONS_FILE), BUILTIN_QUESTIONS).unwrap();

        let err = ReferenceData::load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains(TYPES_FILE));
    }

    #[test]
    fn test_missing_type_code_fails_at_load() {
        let types = r#"
types:
  HHH: { name: A, subtitle: A }
  HHL: { name: B, subtitle: B }
"#;
        let err = ReferenceData::from_yaml(BUILTIN_QUESTIONS, types, BUILTIN_FOLLOWERS)
            .unwrap_err();
        let missing = err
            .downcast_ref::<ReferenceError>()
            .expect("reference error");
        assert!(matches!(missing, ReferenceError::MissingTypeCodes(codes) if codes.len() == 6));
    }

    #[test]
    fn test_sparse_compatibility_allowed() {
        let followers = r#"
followers:
  - { id: driver, name: Driver }
compatibility:
  HHH:
    driver: { score: 95, strength: "Great", caution: "None" }
"#;
        let data =
            ReferenceData::from_yaml(BUILTIN_QUESTIONS, BUILTIN_TYPES, followers).unwrap();
        assert_eq!(data.compatibility.gaps(&data.followers).len(), 7);
    }
}
