use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::{ScoringConfig, SCORE_MAX, SCORE_MIN};
use super::response::{RawScore, ResponseError, ResponseSet};
use crate::reference::{Category, Level, Question, ReferenceData, TypeCode, TypeRecord};

/// Average score per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub sharing: f64,
    pub interaction: f64,
    pub growth: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Sharing => self.sharing,
            Category::Interaction => self.interaction,
            Category::Growth => self.growth,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LowerFactorScore {
    pub label: String,
    pub upper_factor: String,
    pub average: f64,
}

/// Outcome of [`Assessment::determine_type`]
#[derive(Debug, Clone)]
pub struct TypeResult {
    pub code: TypeCode,
    pub record: TypeRecord,
    pub category_scores: CategoryScores,
    pub lower_factor_scores: Vec<LowerFactorScore>,
}

/// One run of the questionnaire.
///
/// Responses can only be changed through [`Assessment::record_response`],
/// [`Assessment::restore_responses`] and [`Assessment::reset`], so every stored
/// score is in range and belongs to a loaded question.
#[derive(Debug, Clone)]
pub struct Assessment {
    reference: Arc<ReferenceData>,
    threshold: f64,
    responses: ResponseSet,
    current: usize,
}

impl Assessment {
    pub fn new(reference: Arc<ReferenceData>, config: &ScoringConfig) -> Self {
        Self {
            reference,
            threshold: config.effective_threshold(),
            responses: ResponseSet::new(),
            current: 0,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Record an answer, overwriting any previous answer for the question.
    ///
    /// Invalid scores and unknown question ids leave the response set unchanged.
    pub fn record_response<'a>(
        &mut self,
        question_id: u32,
        raw: impl Into<RawScore<'a>>,
    ) -> Result<(), ResponseError> {
        let raw = raw.into();
        let Some(score) = raw.parse() else {
            warn!("Invalid score: {} for question {}", raw, question_id);
            return Err(ResponseError::InvalidScore {
                question_id,
                raw: raw.to_string(),
                min: SCORE_MIN,
                max: SCORE_MAX,
            });
        };

        if !self.reference.questions.contains(question_id) {
            warn!("Invalid question ID: {}", question_id);
            return Err(ResponseError::UnknownQuestion(question_id));
        }

        self.responses.insert(question_id, score);
        Ok(())
    }

    /// Replace the response set with a persisted snapshot, re-validating each
    /// entry. Returns the number of entries that were dropped.
    pub fn restore_responses(&mut self, snapshot: &ResponseSet) -> usize {
        self.responses.clear();
        let mut dropped = 0;
        for (id, score) in snapshot.iter() {
            if self.record_response(id, score).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!("Dropped {} stale responses while restoring", dropped);
        }
        dropped
    }

    pub fn response(&self, question_id: u32) -> Option<u8> {
        self.responses.get(question_id).map(|s| s.value())
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    pub fn total_questions(&self) -> usize {
        self.reference.questions.len()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.reference.questions.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Move the cursor. Out-of-range indexes are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.total_questions() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Index of the first question (in presentation order) without an answer
    pub fn next_unanswered(&self) -> Option<usize> {
        self.reference
            .questions
            .iter()
            .position(|q| self.responses.get(q.id).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.reference
            .questions
            .iter()
            .all(|q| self.responses.get(q.id).is_some())
    }

    /// Sum of recorded answers in `category` divided by the number of
    /// questions in that category. Unanswered questions count as 0.
    pub fn category_score(&self, category: Category) -> f64 {
        let (sum, count) = self
            .reference
            .questions
            .in_category(category)
            .fold((0u32, 0u32), |(sum, count), q| {
                (sum + self.score_or_zero(q.id), count + 1)
            });

        if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        }
    }

    pub fn category_scores(&self) -> CategoryScores {
        CategoryScores {
            sharing: self.category_score(Category::Sharing),
            interaction: self.category_score(Category::Interaction),
            growth: self.category_score(Category::Growth),
        }
    }

    /// Averages per lower factor, in order of first appearance in the question list
    pub fn lower_factor_scores(&self) -> Vec<LowerFactorScore> {
        let mut groups: Vec<(&str, &str, u32, u32)> = Vec::new();

        for q in &self.reference.questions {
            let score = self.score_or_zero(q.id);
            match groups.iter_mut().find(|(label, ..)| *label == q.lower_factor) {
                Some((_, _, sum, count)) => {
                    *sum += score;
                    *count += 1;
                }
                None => groups.push((q.lower_factor.as_str(), q.upper_factor.as_str(), score, 1)),
            }
        }

        groups
            .into_iter()
            .map(|(label, upper, sum, count)| LowerFactorScore {
                label: label.to_string(),
                upper_factor: upper.to_string(),
                average: sum as f64 / count as f64,
            })
            .collect()
    }

    /// Classify the current responses.
    ///
    /// Partial response sets are scored too (biased low); callers should
    /// check [`Assessment::is_complete`] before treating this as final.
    pub fn determine_type(&self) -> TypeResult {
        let scores = self.category_scores();
        let level = |score: f64| {
            if score >= self.threshold {
                Level::High
            } else {
                Level::Low
            }
        };

        let code = TypeCode::from_levels(
            level(scores.sharing),
            level(scores.interaction),
            level(scores.growth),
        );

        TypeResult {
            code,
            record: self.reference.typology.get(code).clone(),
            category_scores: scores,
            lower_factor_scores: self.lower_factor_scores(),
        }
    }

    /// Clear responses and the cursor. Reference data is kept.
    pub fn reset(&mut self) {
        self.responses.clear();
        self.current = 0;
    }

    fn score_or_zero(&self, question_id: u32) -> u32 {
        self.responses
            .get(question_id)
            .map(|s| s.value() as u32)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::response::Score;

    /// Five questions per category, two lower factors per category
    fn sample_reference() -> Arc<ReferenceData> {
        let mut questions = String::from("questions:\n");
        for (offset, category, factors) in [
            (0, "sharing", ["Openness", "Participation"]),
            (5, "interaction", ["Empathy", "Dialogue"]),
            (10, "growth", ["Coaching", "Vision"]),
        ] {
            for i in 1..=5u32 {
                let factor = if i <= 3 { factors[0] } else { factors[1] };
                questions.push_str(&format!(
                    "  - {{ id: {}, category: {}, lower_factor: {}, upper_factor: {}, text: \"Q{}\" }}\n",
                    offset + i,
                    category,
                    factor,
                    category,
                    offset + i
                ));
            }
        }
        let data = ReferenceData::from_yaml(
            &questions,
            include_str!("../../data/types.yaml"),
            include_str!("../../data/followers.yaml"),
        )
        .unwrap();
        Arc::new(data)
    }

    fn assessment() -> Assessment {
        Assessment::new(sample_reference(), &ScoringConfig::default())
    }

    /// Answer every question of a category with the given scores (len 5)
    fn answer_category(a: &mut Assessment, category: Category, scores: [i64; 5]) {
        let ids: Vec<u32> = a
            .reference()
            .questions
            .in_category(category)
            .map(|q| q.id)
            .collect();
        for (id, score) in ids.into_iter().zip(scores) {
            a.record_response(id, score).unwrap();
        }
    }

    #[test]
    fn test_record_and_read_back_every_valid_score() {
        let mut a = assessment();
        for s in 1..=6i64 {
            a.record_response(1, s).unwrap();
            assert_eq!(a.response(1), Some(s as u8));
        }
    }

    #[test]
    fn test_invalid_scores_leave_responses_unchanged() {
        let mut a = assessment();
        a.record_response(1, 3).unwrap();
        let before = a.responses().clone();

        assert!(a.record_response(1, 0).is_err());
        assert!(a.record_response(1, 7).is_err());
        assert!(a.record_response(1, 4.5).is_err());
        assert!(a.record_response(1, f64::NAN).is_err());
        assert!(a.record_response(1, "four").is_err());
        assert!(a.record_response(2, "").is_err());

        assert_eq!(a.responses(), &before);
        assert_eq!(
            serde_json::to_string(a.responses()).unwrap(),
            serde_json::to_string(&before).unwrap()
        );
    }

    #[test]
    fn test_unknown_question_rejected() {
        let mut a = assessment();
        let err = a.record_response(99, 4).unwrap_err();
        assert_eq!(err, ResponseError::UnknownQuestion(99));
        assert!(a.responses().is_empty());
    }

    #[test]
    fn test_text_scores_accepted() {
        let mut a = assessment();
        a.record_response(2, "5").unwrap();
        assert_eq!(a.response(2), Some(5));
    }

    #[test]
    fn test_category_score_divides_by_total_questions() {
        let mut a = assessment();
        // Two of five sharing questions answered with 5
        a.record_response(1, 5).unwrap();
        a.record_response(2, 5).unwrap();
        assert_eq!(a.category_score(Category::Sharing), 2.0);
        assert_eq!(a.category_score(Category::Growth), 0.0);
    }

    #[test]
    fn test_category_score_order_independent_and_overwrite() {
        let mut a = assessment();
        a.record_response(1, 2).unwrap();
        a.record_response(2, 6).unwrap();
        a.record_response(1, 4).unwrap(); // overwrite

        let mut b = assessment();
        b.record_response(2, 6).unwrap();
        b.record_response(1, 4).unwrap();

        assert_eq!(
            a.category_score(Category::Sharing),
            b.category_score(Category::Sharing)
        );
        assert_eq!(a.category_score(Category::Sharing), 2.0);
    }

    #[test]
    fn test_all_six_is_hhh() {
        let mut a = assessment();
        for category in Category::ALL {
            answer_category(&mut a, category, [6; 5]);
        }
        let result = a.determine_type();
        assert_eq!(result.code, TypeCode::Hhh);
        assert_eq!(result.record.subtitle, "Transformational Leader");
        assert_eq!(result.category_scores.sharing, 6.0);
    }

    #[test]
    fn test_all_one_is_lll() {
        let mut a = assessment();
        for category in Category::ALL {
            answer_category(&mut a, category, [1; 5]);
        }
        assert_eq!(a.determine_type().code, TypeCode::Lll);
    }

    #[test]
    fn test_five_five_four_is_hhl() {
        let mut a = assessment();
        answer_category(&mut a, Category::Sharing, [5; 5]);
        answer_category(&mut a, Category::Interaction, [5; 5]);
        answer_category(&mut a, Category::Growth, [4; 5]);
        assert_eq!(a.determine_type().code, TypeCode::Hhl);
    }

    #[test]
    fn test_all_eight_codes() {
        let high = [5, 6, 5, 6, 5]; // 5.4
        let low = [3, 4, 3, 4, 3]; // 3.4
        for code in TypeCode::ALL {
            let mut a = assessment();
            for (category, level) in Category::ALL.into_iter().zip(code.levels()) {
                let scores = if level == Level::High { high } else { low };
                answer_category(&mut a, category, scores);
            }
            assert!(a.is_complete());
            let result = a.determine_type();
            assert_eq!(result.code, code);
            assert_eq!(result.record, a.reference().typology.get(code).clone());
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut a = assessment();
        answer_category(&mut a, Category::Sharing, [5, 4, 5, 4, 5]); // 4.6
        answer_category(&mut a, Category::Interaction, [4, 5, 4, 5, 4]); // 4.4
        answer_category(&mut a, Category::Growth, [6, 3, 6, 3, 5]); // 4.6
        assert_eq!(a.determine_type().code, TypeCode::Hlh);

        let mut exact = Assessment::new(
            sample_reference(),
            &ScoringConfig {
                threshold: Some(4.6),
            },
        );
        answer_category(&mut exact, Category::Sharing, [5, 4, 5, 4, 5]);
        answer_category(&mut exact, Category::Interaction, [5, 4, 5, 4, 4]); // 4.4
        answer_category(&mut exact, Category::Growth, [5, 4, 5, 4, 5]);
        assert_eq!(exact.determine_type().code, TypeCode::Hlh);
    }

    #[test]
    fn test_exact_default_threshold_is_high() {
        // Six-question categories average exactly 4.5 with [4,5,4,5,4,5]
        let data = ReferenceData::builtin().unwrap();
        let mut a = Assessment::new(Arc::new(data), &ScoringConfig::default());
        for category in Category::ALL {
            let ids: Vec<u32> = a
                .reference()
                .questions
                .in_category(category)
                .map(|q| q.id)
                .collect();
            let pattern: [i64; 6] = match category {
                Category::Sharing => [4, 5, 4, 5, 4, 5],     // 4.5
                Category::Interaction => [4, 5, 4, 5, 4, 4], // 4.33
                Category::Growth => [6, 3, 6, 3, 6, 3],      // 4.5
            };
            for (id, s) in ids.into_iter().zip(pattern) {
                a.record_response(id, s).unwrap();
            }
        }
        let result = a.determine_type();
        assert_eq!(result.category_scores.sharing, 4.5);
        assert_eq!(result.code, TypeCode::Hlh);
    }

    #[test]
    fn test_determine_type_is_pure() {
        let mut a = assessment();
        answer_category(&mut a, Category::Sharing, [6, 1, 6, 1, 6]);
        let first = a.determine_type();
        let second = a.determine_type();
        assert_eq!(first.code, second.code);
        assert_eq!(first.category_scores, second.category_scores);
    }

    #[test]
    fn test_lower_factor_scores() {
        let mut a = assessment();
        answer_category(&mut a, Category::Sharing, [6, 6, 6, 2, 4]);

        let factors = a.lower_factor_scores();
        assert_eq!(factors.len(), 6);
        assert_eq!(factors[0].label, "Openness");
        assert_eq!(factors[0].upper_factor, "sharing");
        assert_eq!(factors[0].average, 6.0);
        assert_eq!(factors[1].label, "Participation");
        assert_eq!(factors[1].average, 3.0);
        assert_eq!(factors[2].label, "Empathy");
        assert_eq!(factors[2].average, 0.0);
    }

    #[test]
    fn test_is_complete_lifecycle() {
        let mut a = assessment();
        assert!(!a.is_complete());

        let ids: Vec<u32> = a.reference().questions.iter().map(|q| q.id).collect();
        for (n, id) in ids.iter().enumerate() {
            assert!(!a.is_complete());
            a.record_response(*id, (n % 6 + 1) as i64).unwrap();
        }
        assert!(a.is_complete());

        a.record_response(ids[0], 2).unwrap();
        assert!(a.is_complete());

        a.reset();
        assert!(!a.is_complete());
        assert_eq!(a.answered_count(), 0);
        assert_eq!(a.current_index(), 0);
        assert_eq!(a.total_questions(), 15);
    }

    #[test]
    fn test_next_unanswered_and_cursor() {
        let mut a = assessment();
        assert_eq!(a.next_unanswered(), Some(0));
        a.record_response(1, 3).unwrap();
        assert_eq!(a.next_unanswered(), Some(1));

        assert!(a.go_to(4));
        assert_eq!(a.current_index(), 4);
        assert!(!a.go_to(15));
        assert_eq!(a.current_index(), 4);
    }

    #[test]
    fn test_restore_responses_drops_unknown_ids() {
        let mut snapshot = ResponseSet::new();
        snapshot.insert(1, Score::new(4).unwrap());
        snapshot.insert(42, Score::new(5).unwrap());

        let mut a = assessment();
        a.record_response(3, 6).unwrap();
        let dropped = a.restore_responses(&snapshot);

        assert_eq!(dropped, 1);
        assert_eq!(a.response(1), Some(4));
        assert_eq!(a.response(3), None);
        assert_eq!(a.answered_count(), 1);
    }
}
