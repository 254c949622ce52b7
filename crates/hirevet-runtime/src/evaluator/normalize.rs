//! Normalization: turn a repaired provider response into a typed,
//! range-safe [`SessionEvaluation`].
//!
//! Provider JSON is partially shaped at best. Normalization guarantees the
//! output invariants regardless of what arrived:
//!
//! - exactly one per-answer entry for every answer index, in order
//! - per-answer scores clamped to 0-10, defaulting to a neutral 5
//! - an overall score clamped to 0-100, derived from the per-answer mean
//!   when the provider omitted it
//! - placeholder text for any missing feedback/summary field
//!
//! Out-of-range numerics are clamped silently; they are never an error.

use hirevet_core::{overall_from_answers, OverallEvaluation, PerAnswerEvaluation, SessionEvaluation};
use serde_json::Value as JsonValue;

/// Neutral score for an answer the provider did not cover.
const NEUTRAL_SCORE: u8 = 5;

const DEFAULT_FEEDBACK: &str = "No specific feedback provided";
const DEFAULT_SUMMARY: &str = "Interview evaluation completed";
const DEFAULT_RECOMMENDATION: &str = "Review performance";

/// Normalize a repaired provider response for a session of `answer_count`
/// answers.
pub fn normalize_evaluation(raw: &JsonValue, answer_count: usize) -> SessionEvaluation {
    let entries = raw
        .get("perAnswer")
        .or_else(|| raw.get("per_answer"))
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let per_answer: Vec<PerAnswerEvaluation> = (0..answer_count)
        .map(|index| {
            let entry = entries
                .iter()
                .find(|e| coerce_index(e.get("index")) == Some(index));
            normalize_per_answer(index, entry)
        })
        .collect();

    let overall = normalize_overall(raw.get("overall"), &per_answer);

    SessionEvaluation {
        per_answer,
        overall,
    }
}

fn normalize_per_answer(index: usize, entry: Option<&JsonValue>) -> PerAnswerEvaluation {
    let score = entry
        .and_then(|e| coerce_score(e.get("score"), 10.0))
        .unwrap_or(NEUTRAL_SCORE);

    let feedback = entry
        .and_then(|e| coerce_string(e.get("feedback")))
        .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string());

    PerAnswerEvaluation {
        index,
        score,
        feedback,
        strengths: entry
            .map(|e| coerce_string_list(e.get("strengths")))
            .unwrap_or_default(),
        improvements: entry
            .map(|e| coerce_string_list(e.get("improvements")))
            .unwrap_or_default(),
    }
}

fn normalize_overall(
    overall: Option<&JsonValue>,
    per_answer: &[PerAnswerEvaluation],
) -> OverallEvaluation {
    // Missing or non-numeric score: derive from the per-answer mean.
    let score = overall
        .and_then(|o| coerce_score(o.get("score"), 100.0))
        .unwrap_or_else(|| overall_from_answers(per_answer));

    let summary = overall
        .and_then(|o| coerce_string(o.get("summary")))
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    let recommendation = overall
        .and_then(|o| coerce_string(o.get("recommendation")))
        .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string());

    let strengths = match overall.map(|o| coerce_string_list(o.get("strengths"))) {
        Some(list) if !list.is_empty() => list,
        _ => vec!["Participated in interview".to_string()],
    };

    let improvements = match overall.map(|o| coerce_string_list(o.get("improvements"))) {
        Some(list) if !list.is_empty() => list,
        _ => vec!["Continue learning".to_string()],
    };

    OverallEvaluation {
        score,
        summary,
        strengths,
        improvements,
        recommendation,
    }
}

/// A numeric score, rounded and clamped to `0..=max`. Numeric strings
/// count; anything else is `None`.
fn coerce_score(value: Option<&JsonValue>, max: f64) -> Option<u8> {
    let number = match value? {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, max) as u8)
}

/// A non-empty string.
fn coerce_string(value: Option<&JsonValue>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// A list of strings; non-string elements are dropped.
fn coerce_string_list(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn coerce_index(value: Option<&JsonValue>) -> Option<usize> {
    match value? {
        JsonValue::Number(n) => n.as_u64().map(|n| n as usize),
        JsonValue::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}
