use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::config::{SCORE_MAX, SCORE_MIN};

/// Why a response was not recorded. The response set is unchanged in every case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("invalid score '{raw}' for question {question_id}: expected an integer {min}-{max}")]
    InvalidScore {
        question_id: u32,
        raw: String,
        min: u8,
        max: u8,
    },

    #[error("unknown question id {0}")]
    UnknownQuestion(u32),
}

/// A validated answer on the 1..=6 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Option<Self> {
        if value < SCORE_MIN as i64 || value > SCORE_MAX as i64 {
            return None;
        }
        Some(Score(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value as i64)
            .ok_or_else(|| format!("score {} outside {}-{}", value, SCORE_MIN, SCORE_MAX))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw answer as handed over by an input collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScore<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl RawScore<'_> {
    /// Validate into a [`Score`]. Fractional, non-finite, non-numeric and
    /// out-of-range inputs are rejected.
    pub fn parse(&self) -> Option<Score> {
        match *self {
            RawScore::Int(n) => Score::new(n),
            RawScore::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 {
                    Score::new(f as i64)
                } else {
                    None
                }
            }
            RawScore::Text(s) => s.trim().parse::<i64>().ok().and_then(Score::new),
        }
    }
}

impl fmt::Display for RawScore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScore::Int(n) => write!(f, "{}", n),
            RawScore::Float(x) => write!(f, "{}", x),
            RawScore::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RawScore<'_> {
    fn from(n: i64) -> Self {
        RawScore::Int(n)
    }
}

impl From<i32> for RawScore<'_> {
    fn from(n: i32) -> Self {
        RawScore::Int(n as i64)
    }
}

impl From<u8> for RawScore<'_> {
    fn from(n: u8) -> Self {
        RawScore::Int(n as i64)
    }
}

impl From<f64> for RawScore<'_> {
    fn from(x: f64) -> Self {
        RawScore::Float(x)
    }
}

impl<'a> From<&'a str> for RawScore<'a> {
    fn from(s: &'a str) -> Self {
        RawScore::Text(s)
    }
}

impl From<Score> for RawScore<'_> {
    fn from(score: Score) -> Self {
        RawScore::Int(score.value() as i64)
    }
}

/// Question id -> validated score.
///
/// Serializes as a plain JSON object so snapshots can be persisted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet(BTreeMap<u32, Score>);

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: u32) -> Option<Score> {
        self.0.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Score)> + '_ {
        self.0.iter().map(|(id, score)| (*id, *score))
    }

    pub(crate) fn insert(&mut self, question_id: u32, score: Score) {
        self.0.insert(question_id, score);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}
