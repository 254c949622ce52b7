//! Core types for candidate evaluation.
//!
//! These records mirror the platform's candidate documents: an interview
//! session flows in, a per-answer/overall evaluation comes out of the
//! response evaluator, and the composite aggregator folds accumulated
//! signals into a single [`EvaluationResult`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Question difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Multiplier applied by the heuristic scorer.
    ///
    /// Harder questions earn a bonus for any substantive answer.
    pub fn factor(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.1,
            Difficulty::Hard => 1.2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// A single interview question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Question text shown to the candidate
    pub text: String,

    /// Difficulty level
    pub difficulty: Difficulty,
}

/// A candidate's answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Answer text, possibly empty
    #[serde(default)]
    pub text: String,

    /// Seconds spent on the question
    #[serde(default)]
    pub time_spent: u32,

    /// True when the time limit expired before submission
    #[serde(default)]
    pub is_auto_submitted: bool,
}

/// An ordered sequence of question/answer pairs.
///
/// Sessions are inputs to the response evaluator; they are not persisted
/// by the evaluation pipeline itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewSession {
    pub entries: Vec<SessionEntry>,
}

/// One question/answer pair within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub question: Question,
    pub answer: Answer,
}

impl InterviewSession {
    /// Create a session from question/answer pairs.
    pub fn new(entries: Vec<SessionEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Evaluation of a single answer.
///
/// Invariant: exactly one of these per input answer, `index` equal to the
/// answer's position in the session, `score` within 0..=10, `feedback`
/// non-empty. Missing or unparseable provider entries are synthesized with
/// a neutral score of 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerAnswerEvaluation {
    /// 0-based position in the session
    pub index: usize,

    /// Score on a 0-10 scale
    pub score: u8,

    /// Free-text feedback, never empty
    pub feedback: String,

    #[serde(default)]
    pub strengths: Vec<String>,

    #[serde(default)]
    pub improvements: Vec<String>,
}

/// Overall evaluation of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallEvaluation {
    /// Score on a 0-100 scale
    pub score: u8,

    pub summary: String,

    #[serde(default)]
    pub strengths: Vec<String>,

    #[serde(default)]
    pub improvements: Vec<String>,

    /// Free-text hiring recommendation
    pub recommendation: String,
}

/// Full output of the response evaluator for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvaluation {
    pub per_answer: Vec<PerAnswerEvaluation>,
    pub overall: OverallEvaluation,
}

impl SessionEvaluation {
    /// Per-answer scores, in session order.
    pub fn answer_scores(&self) -> Vec<u8> {
        self.per_answer.iter().map(|p| p.score).collect()
    }
}

/// Signals accumulated on a candidate by upstream analysis subsystems.
///
/// Every field is optional: a candidate may have completed only some of
/// the analysis stages. The aggregator reads these; it never writes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSignals {
    /// Technical skill score, 0-100
    pub technical_score: Option<f64>,

    /// Emotional intelligence score, 0-10
    pub eq_score: Option<f64>,

    /// Behavioral analysis score, 0-100
    pub behavior_score: Option<f64>,

    /// Predicted hiring probability, 0-100
    pub hiring_probability_score: Option<f64>,

    /// Learning velocity, 0-10
    pub learning_velocity: Option<f64>,

    /// Personality trait: openness, 0-100
    pub openness: Option<f64>,

    /// Personality trait: conscientiousness, 0-100
    pub conscientiousness: Option<f64>,

    /// Adaptability sub-score, 0-100
    pub adaptability: Option<f64>,

    /// Emotional stability, 0-100
    pub emotional_stability: Option<f64>,

    /// Team collaboration, 0-100
    pub team_collaboration: Option<f64>,

    /// Culture fit, 0-100
    pub culture_fit_score: Option<f64>,

    /// Stress tolerance, 0-100
    pub stress_tolerance: Option<f64>,

    /// Per-answer interview scores (0-10 each), folded in from a persisted
    /// session evaluation. Used only when no weighted component is present.
    #[serde(default)]
    pub answer_scores: Vec<u8>,
}

/// Four-level categorical hiring recommendation.
///
/// Derived purely from the interview score against the global rubric;
/// independent of the template-configurable passing threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    StrongHire,
    Hire,
    Maybe,
    Reject,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::StrongHire => write!(f, "Strong Hire"),
            Verdict::Hire => write!(f, "Hire"),
            Verdict::Maybe => write!(f, "Maybe"),
            Verdict::Reject => write!(f, "Reject"),
        }
    }
}

/// The decision record produced by the composite aggregator.
///
/// Written exactly once per candidate in normal operation; the candidate
/// record is the durable owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Composite interview score, 0-100
    pub interview_score: u8,

    /// Growth potential estimate, 0-100
    pub growth_potential: u8,

    /// Retention estimate, 0-100
    pub retention_score: u8,

    /// Whether the interview score met the passing threshold
    pub passed: bool,

    pub verdict: Verdict,

    pub evaluated_at: DateTime<Utc>,
}
