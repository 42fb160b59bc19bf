use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::ReferenceError;

/// One of the three assessment axes, in typology code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sharing,
    Interaction,
    Growth,
}

impl Category {
    /// Axis order used when building a typology code
    pub const ALL: [Category; 3] = [Category::Sharing, Category::Interaction, Category::Growth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sharing => "sharing",
            Category::Interaction => "interaction",
            Category::Growth => "growth",
        }
    }

    /// Human-readable axis label for output
    pub fn label(&self) -> &'static str {
        match self {
            Category::Sharing => "Sharing",
            Category::Interaction => "Interaction",
            Category::Growth => "Growth",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub id: u32,
    pub category: Category,
    pub lower_factor: String,
    pub upper_factor: String,
    pub text: String,
}

/// The loaded questionnaire, in presentation order.
///
/// Construction guarantees unique ids and at least one question per category,
/// so category averages never divide by zero for a validly built set.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Result<Self, ReferenceError> {
        if questions.is_empty() {
            return Err(ReferenceError::NoQuestions);
        }

        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id) {
                return Err(ReferenceError::DuplicateQuestion(q.id));
            }
        }

        for category in Category::ALL {
            if !questions.iter().any(|q| q.category == category) {
                return Err(ReferenceError::EmptyCategory(category));
            }
        }

        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn find(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.find(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.category == category)
    }

    /// Position of a question id in presentation order
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}
