//! Position-by-position comparison of an answer key against a response

use serde::{Deserialize, Serialize};

/// Letters used for choice indices 0..=3
const CHOICE_LETTERS: [&str; 4] = ["A", "B", "C", "D"];
/// Letter reported for an index outside the known choices
const UNKNOWN_CHOICE: &str = "?";

/// Outcome for a single question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// 1-based question number
    pub question: usize,
    pub correct_choice: String,
    pub student_choice: String,
    pub is_correct: bool,
}

/// Score of a response against the key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Number of questions compared
    pub total: usize,
    pub correct: usize,
    /// Share of correct answers in percent, rounded to two decimals
    pub percentage: f64,
    pub detail: Vec<QuestionResult>,
}

/// Letter for a choice index, `"?"` when it has none
pub fn choice_letter(index: usize) -> &'static str {
    CHOICE_LETTERS.get(index).copied().unwrap_or(UNKNOWN_CHOICE)
}

/// Compare `response` against `key`
///
/// Only the first `min(key.len(), response.len())` positions are scored; the
/// rest of the longer sequence is ignored.
pub fn compare(key: &[usize], response: &[usize]) -> ScoreReport {
    let detail: Vec<QuestionResult> = key
        .iter()
        .zip(response.iter())
        .enumerate()
        .map(|(i, (expected, given))| QuestionResult {
            question: i + 1,
            correct_choice: choice_letter(*expected).to_string(),
            student_choice: choice_letter(*given).to_string(),
            is_correct: expected == given,
        })
        .collect();

    let total = detail.len();
    let correct = detail.iter().filter(|q| q.is_correct).count();

    ScoreReport {
        total,
        correct,
        percentage: round2(100.0 * correct as f64 / total.max(1) as f64),
        detail,
    }
}

/// Round to two decimals, exact halves going to the even neighbour
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
