//! Heuristic scorer: the deterministic evaluation fallback.
//!
//! When no reasoning provider is configured, or every configured provider
//! fails, answers are scored by this rule-based policy instead. The policy
//! is user-observable output, so it is fixed:
//!
//! | Condition | Effect |
//! |-----------|--------|
//! | Empty/whitespace answer | score 0, "No answer provided" |
//! | < 10 words | base 2 |
//! | < 30 words | base 4 |
//! | < 80 words | base 6 |
//! | >= 80 words | base 7 |
//! | Mentions an example/instance/case/scenario | +1 |
//! | Uses technical vocabulary | +1 |
//! | Auto-submitted (time expired) | -2, floor 1 |
//! | Difficulty | x1.0 easy, x1.1 medium, x1.2 hard |
//!
//! Final per-answer scores are rounded and clamped to 0-10; the overall
//! score is the rounded mean times ten.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{
    Answer, InterviewSession, OverallEvaluation, PerAnswerEvaluation, Question, SessionEvaluation,
};

lazy_static! {
    /// Concrete-example indicators.
    static ref EXAMPLE_PATTERN: Regex =
        Regex::new(r"(?i)\b(example|instance|case|scenario)\b").unwrap();

    /// Technical vocabulary indicators.
    static ref TECHNICAL_PATTERN: Regex =
        Regex::new(r"(?i)\b(algorithm|function|method|class|object|array|database)\b").unwrap();
}

/// Feedback for an empty answer. Fixed, user-observable.
const NO_ANSWER_FEEDBACK: &str = "No answer provided";

/// Score one answer against its question.
pub fn score_answer(index: usize, question: &Question, answer: &Answer) -> PerAnswerEvaluation {
    let text = answer.text.trim();

    if text.is_empty() {
        return PerAnswerEvaluation {
            index,
            score: 0,
            feedback: NO_ANSWER_FEEDBACK.to_string(),
            strengths: vec![],
            improvements: improvements_for(0),
        };
    }

    let word_count = text.split_whitespace().count();
    let (base, band_feedback) = match word_count {
        0..=9 => (2u32, "Very brief answer, needs more detail"),
        10..=29 => (4, "Short answer, needs more explanation"),
        30..=79 => (6, "Adequate answer with reasonable detail"),
        _ => (7, "Good detailed answer"),
    };

    let mut score = base;
    if EXAMPLE_PATTERN.is_match(text) {
        score += 1;
    }
    if TECHNICAL_PATTERN.is_match(text) {
        score += 1;
    }

    let mut feedback = band_feedback.to_string();
    if answer.is_auto_submitted {
        score = score.saturating_sub(2).max(1);
        feedback.push_str(" (time expired)");
    }

    let adjusted = (score as f64 * question.difficulty.factor()).round();
    let score = adjusted.clamp(0.0, 10.0) as u8;

    PerAnswerEvaluation {
        index,
        score,
        feedback,
        strengths: strengths_for(score),
        improvements: improvements_for(score),
    }
}

/// Evaluate a full session deterministically.
///
/// Produces exactly one [`PerAnswerEvaluation`] per session entry and an
/// overall score equal to `round(mean(per_answer) * 10)`. Never fails.
pub fn evaluate_session(session: &InterviewSession) -> SessionEvaluation {
    let per_answer: Vec<PerAnswerEvaluation> = session
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| score_answer(i, &entry.question, &entry.answer))
        .collect();

    let overall_score = overall_from_answers(&per_answer);

    SessionEvaluation {
        overall: build_overall(overall_score, per_answer.len()),
        per_answer,
    }
}

/// Overall score derived from per-answer scores: `round(mean * 10)`,
/// clamped to 0-100. Empty input scores 0.
pub fn overall_from_answers(per_answer: &[PerAnswerEvaluation]) -> u8 {
    if per_answer.is_empty() {
        return 0;
    }
    let sum: u32 = per_answer.iter().map(|p| p.score as u32).sum();
    let mean = sum as f64 / per_answer.len() as f64;
    (mean * 10.0).round().clamp(0.0, 100.0) as u8
}

/// Step-function recommendation for an overall score.
pub fn recommendation_for(overall_score: u8) -> &'static str {
    match overall_score {
        80..=100 => "Excellent",
        70..=79 => "Good",
        60..=69 => "Average",
        50..=59 => "Below average",
        _ => "Needs improvement",
    }
}

fn build_overall(score: u8, answered: usize) -> OverallEvaluation {
    let summary = format!(
        "Interview completed with {}% performance across {} answer{}.",
        score,
        answered,
        if answered == 1 { "" } else { "s" }
    );

    let strengths = if score >= 70 {
        vec![
            "Consistent performance".to_string(),
            "Good technical knowledge".to_string(),
        ]
    } else if score >= 40 {
        vec!["Participated in interview".to_string()]
    } else {
        vec![]
    };

    let improvements = if score < 70 {
        vec![
            "Improve technical depth".to_string(),
            "Provide more detailed answers".to_string(),
        ]
    } else {
        vec!["Continue deepening expertise".to_string()]
    };

    OverallEvaluation {
        score,
        summary,
        strengths,
        improvements,
        recommendation: recommendation_for(score).to_string(),
    }
}

fn strengths_for(score: u8) -> Vec<String> {
    if score >= 7 {
        vec![
            "Good understanding".to_string(),
            "Clear explanation".to_string(),
        ]
    } else if score >= 4 {
        vec!["Basic understanding".to_string()]
    } else {
        vec![]
    }
}

fn improvements_for(score: u8) -> Vec<String> {
    if score < 5 {
        vec![
            "Needs more detail".to_string(),
            "Practice explaining concepts".to_string(),
        ]
    } else if score < 7 {
        vec![
            "Add more examples".to_string(),
            "Improve depth".to_string(),
        ]
    } else {
        vec![]
    }
}
