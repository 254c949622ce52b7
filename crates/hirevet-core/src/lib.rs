//! # hirevet-core
//!
//! Deterministic scoring engine for the candidate evaluation pipeline.
//!
//! This crate answers two questions without any I/O:
//! - What does an interview session score when no reasoning provider is
//!   available? (the [`heuristic`] scorer)
//! - What single decision record do a candidate's accumulated signals
//!   produce? (the [`aggregator`])
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No network calls**: All scoring is rule-based
//! 3. **Total**: Every answer gets exactly one evaluation; missing signals
//!    fall back to documented defaults
//! 4. **Bounded**: Per-answer scores stay within 0-10, composite scores
//!    within 0-100, for any input
//!
//! ## Example
//!
//! ```rust,ignore
//! use hirevet_core::{evaluate_session, CompositeAggregator, ScoringConfig};
//!
//! let evaluation = evaluate_session(&session);
//! let aggregator = CompositeAggregator::new(ScoringConfig::default());
//! let result = aggregator.aggregate(&candidate.signals, template_threshold);
//! println!("{} ({})", result.interview_score, result.verdict);
//! ```

pub mod aggregator;
pub mod config;
pub mod heuristic;
pub mod types;

// Re-export main types at crate root
pub use aggregator::CompositeAggregator;
pub use config::{ComponentWeights, ConfigError, ScoringConfig, VerdictBands};
pub use heuristic::{evaluate_session, overall_from_answers, recommendation_for, score_answer};
pub use types::{
    Answer, CandidateSignals, Difficulty, EvaluationResult, InterviewSession, OverallEvaluation,
    PerAnswerEvaluation, Question, SessionEntry, SessionEvaluation, Verdict,
};
