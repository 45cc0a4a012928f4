//! Scoring detected answers against an answer key.

use serde::{Deserialize, Serialize};

use crate::domain::{Answer, AnswerKey};

/// Outcome of scoring one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTally {
    /// Score in [0, 100], two decimals.
    pub score: f64,
    /// Matching answers.
    pub correct: usize,
    /// Non-matching answers, multiple marks included.
    pub incorrect: usize,
    /// Unanswered questions.
    pub blank: usize,
}

/// Scores answers against a key.
///
/// Only the first `key.len()` answers are graded; trailing answers are
/// ignored. With an empty key every answer counts as blank and the score is 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    weighted: bool,
}

impl Scorer {
    /// Creates a scorer. `weighted` applies the key's question weights, when
    /// the key declares any, to the percentage.
    #[must_use]
    pub const fn new(weighted: bool) -> Self {
        Self { weighted }
    }

    /// Tallies `answers` against `key`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, answers: &[Answer], key: &AnswerKey) -> ScoreTally {
        if key.is_empty() {
            return ScoreTally {
                score: 0.0,
                correct: 0,
                incorrect: 0,
                blank: answers.len(),
            };
        }

        let mut tally = ScoreTally {
            score: 0.0,
            correct: 0,
            incorrect: 0,
            blank: 0,
        };
        let mut earned_weight = 0.0;

        for (index, answer) in answers.iter().take(key.len()).enumerate() {
            match answer {
                Answer::Blank => tally.blank += 1,
                Answer::Multiple => tally.incorrect += 1,
                Answer::Choice(letter) if key.is_correct(index, *letter) => {
                    tally.correct += 1;
                    earned_weight += self.weight(key, index);
                }
                Answer::Choice(_) => tally.incorrect += 1,
            }
        }

        let fraction = match key.weights().filter(|_| self.weighted) {
            Some(weights) => earned_weight / weights.iter().sum::<f64>(),
            None => tally.correct as f64 / key.len() as f64,
        };
        tally.score = round_to(fraction * 100.0, 2);
        tally
    }

    fn weight(&self, key: &AnswerKey, index: usize) -> f64 {
        key.weights()
            .filter(|_| self.weighted)
            .and_then(|w| w.get(index).copied())
            .unwrap_or(1.0)
    }
}

/// Rounds `value` to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(letters: &[&str]) -> AnswerKey {
        AnswerKey::new(letters, None).unwrap()
    }

    fn parse(answers: &[&str]) -> Vec<Answer> {
        answers.iter().map(|a| a.parse().unwrap()).collect()
    }

    #[test]
    fn test_perfect_sheet() {
        let tally = Scorer::default().score(&parse(&["A", "B", "C", "D"]), &key(&["A", "B", "C", "D"]));
        assert_eq!(
            tally,
            ScoreTally {
                score: 100.0,
                correct: 4,
                incorrect: 0,
                blank: 0
            }
        );
    }

    #[test]
    fn test_mixed_sheet() {
        let tally = Scorer::default().score(&parse(&["A", "B", "X", ""]), &key(&["A", "B", "C", "D"]));
        assert_eq!(tally.correct, 2);
        assert_eq!(tally.incorrect, 1);
        assert_eq!(tally.blank, 1);
        assert!((tally.score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_key_counts_everything_blank() {
        let empty = AnswerKey::new::<&str>(&[], None).unwrap();
        let tally = Scorer::default().score(&parse(&["A", "", "MULTIPLE"]), &empty);
        assert_eq!(tally.blank, 3);
        assert_eq!(tally.correct + tally.incorrect, 0);
        assert!(tally.score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_multiple_never_correct() {
        let tally = Scorer::default().score(&[Answer::Multiple, Answer::Multiple], &key(&["A", "B"]));
        assert_eq!(tally.correct, 0);
        assert_eq!(tally.incorrect, 2);
    }

    #[test]
    fn test_case_insensitive_match() {
        let tally = Scorer::default().score(&parse(&["a", "b"]), &key(&["A", "B"]));
        assert_eq!(tally.correct, 2);
    }

    #[test]
    fn test_trailing_answers_ignored() {
        let tally = Scorer::default().score(&parse(&["A", "B", "C", "D", "A"]), &key(&["A", "B", "C"]));
        assert_eq!(tally.correct + tally.incorrect + tally.blank, 3);
        assert!((tally.score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_short_answer_list_scored_against_full_key() {
        let tally = Scorer::default().score(&parse(&["A"]), &key(&["A", "B", "C"]));
        assert_eq!(tally.correct + tally.incorrect + tally.blank, 1);
        assert!((tally.score - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_weights_ignored_unless_enabled() {
        let weighted_key = AnswerKey::new(&["A", "B"], Some(vec![3.0, 1.0])).unwrap();
        let answers = parse(&["A", "C"]);

        let plain = Scorer::new(false).score(&answers, &weighted_key);
        assert!((plain.score - 50.0).abs() < f64::EPSILON);

        let weighted = Scorer::new(true).score(&answers, &weighted_key);
        assert!((weighted.score - 75.0).abs() < f64::EPSILON);
        assert_eq!(weighted.correct, 1);
        assert_eq!(weighted.incorrect, 1);
    }

    #[test]
    fn test_weighted_without_key_weights_falls_back() {
        let tally = Scorer::new(true).score(&parse(&["A", "C"]), &key(&["A", "B"]));
        assert!((tally.score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_bounds() {
        let k = key(&["A", "B", "C"]);
        for answers in [
            parse(&["", "", ""]),
            parse(&["A", "B", "C"]),
            parse(&["D", "MULTIPLE", "C", "A", "B"]),
        ] {
            let tally = Scorer::default().score(&answers, &k);
            assert!((0.0..=100.0).contains(&tally.score));
        }
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(66.666_666, 2) - 66.67).abs() < 1e-9);
        assert!((round_to(0.123_456, 3) - 0.123).abs() < 1e-9);
    }
}
