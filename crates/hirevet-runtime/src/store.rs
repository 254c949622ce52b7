//! Candidate storage.
//!
//! The candidate record is the single durable owner of accumulated signals
//! and the evaluation result. The store contract is deliberately small:
//! get one, apply an evaluation update to one (single-document atomicity,
//! no transactions), and list the ones pending evaluation. The
//! orchestrator is the only writer of evaluation fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hirevet_core::{CandidateSignals, EvaluationResult, SessionEvaluation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from candidate storage.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("candidate not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// Candidate lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Pending,
    Analyzing,
    Interview,
    Completed,
    Rejected,
}

/// Hiring decision recorded by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HireStatus {
    Offered,
    Rejected,
}

/// An interview template assigned to a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,

    /// Template-specific passing threshold, 0-100
    pub passing_score: u8,
}

/// A candidate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub applied_for: Option<String>,

    #[serde(default)]
    pub assigned_template: Option<Template>,

    /// Signals produced by upstream analysis subsystems
    #[serde(default)]
    pub signals: CandidateSignals,

    /// Persisted response-evaluator output, when an interview has been run
    #[serde(default)]
    pub session_evaluation: Option<SessionEvaluation>,

    // Evaluation fields, written only by the orchestrator.
    #[serde(default)]
    pub interview_score: Option<u8>,

    #[serde(default)]
    pub growth_potential: Option<u8>,

    #[serde(default)]
    pub retention_score: Option<u8>,

    #[serde(default)]
    pub interview_completed: bool,

    #[serde(default = "default_status")]
    pub status: CandidateStatus,

    #[serde(default)]
    pub ai_hire_status: Option<HireStatus>,

    #[serde(default)]
    pub evaluated_at: Option<DateTime<Utc>>,
}

fn default_status() -> CandidateStatus {
    CandidateStatus::Pending
}

impl Candidate {
    /// A fresh candidate with no signals and no evaluation.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            applied_for: None,
            assigned_template: None,
            signals: CandidateSignals::default(),
            session_evaluation: None,
            interview_score: None,
            growth_potential: None,
            retention_score: None,
            interview_completed: false,
            status: CandidateStatus::Pending,
            ai_hire_status: None,
            evaluated_at: None,
        }
    }

    /// The template's passing threshold, if a template is assigned.
    pub fn passing_threshold(&self) -> Option<u8> {
        self.assigned_template.as_ref().map(|t| t.passing_score)
    }

    /// Whether this candidate is awaiting evaluation.
    pub fn is_pending_evaluation(&self) -> bool {
        self.interview_completed && self.interview_score.is_none()
    }

    /// Signals with the session evaluation's answer scores folded in.
    pub fn effective_signals(&self) -> CandidateSignals {
        let mut signals = self.signals.clone();
        if signals.answer_scores.is_empty() {
            if let Some(session_eval) = &self.session_evaluation {
                signals.answer_scores = session_eval.answer_scores();
            }
        }
        signals
    }
}

/// The field set persisted by the orchestrator in one atomic write.
#[derive(Debug, Clone)]
pub struct EvaluationUpdate {
    pub interview_score: u8,
    pub growth_potential: u8,
    pub retention_score: u8,
    pub ai_hire_status: HireStatus,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationUpdate {
    pub fn from_result(result: &EvaluationResult) -> Self {
        Self {
            interview_score: result.interview_score,
            growth_potential: result.growth_potential,
            retention_score: result.retention_score,
            ai_hire_status: if result.passed {
                HireStatus::Offered
            } else {
                HireStatus::Rejected
            },
            evaluated_at: result.evaluated_at,
        }
    }

    /// Apply this update to a candidate record.
    pub fn apply_to(&self, candidate: &mut Candidate) {
        candidate.interview_score = Some(self.interview_score);
        candidate.growth_potential = Some(self.growth_potential);
        candidate.retention_score = Some(self.retention_score);
        candidate.interview_completed = true;
        candidate.status = CandidateStatus::Completed;
        candidate.ai_hire_status = Some(self.ai_hire_status);
        candidate.evaluated_at = Some(self.evaluated_at);
    }
}

/// Candidate CRUD as seen by the evaluation pipeline.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Fetch a candidate by id.
    async fn get(&self, id: &str) -> Result<Candidate, StoreError>;

    /// Persist an evaluation update. Returns the updated record.
    async fn apply(&self, id: &str, update: EvaluationUpdate) -> Result<Candidate, StoreError>;

    /// Ids of candidates with a completed interview and no score yet.
    async fn pending_evaluation(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store backed by a `BTreeMap` for deterministic iteration.
///
/// Used by tests and as the CLI's working set; a database-backed store
/// implements the same trait.
#[derive(Default)]
pub struct MemoryStore {
    candidates: RwLock<BTreeMap<String, Candidate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: RwLock::new(
                candidates.into_iter().map(|c| (c.id.clone(), c)).collect(),
            ),
        }
    }

    pub fn insert(&self, candidate: Candidate) {
        self.candidates
            .write()
            .insert(candidate.id.clone(), candidate);
    }

    /// All candidates, in id order.
    pub fn snapshot(&self) -> Vec<Candidate> {
        self.candidates.read().values().cloned().collect()
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Candidate, StoreError> {
        self.candidates
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn apply(&self, id: &str, update: EvaluationUpdate) -> Result<Candidate, StoreError> {
        let mut candidates = self.candidates.write();
        let candidate = candidates
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        update.apply_to(candidate);
        Ok(candidate.clone())
    }

    async fn pending_evaluation(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .candidates
            .read()
            .values()
            .filter(|c| c.is_pending_evaluation())
            .map(|c| c.id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_candidate(id: &str) -> Candidate {
        let mut candidate = Candidate::new(id, "Test Person");
        candidate.interview_completed = true;
        candidate
    }

    fn update() -> EvaluationUpdate {
        EvaluationUpdate {
            interview_score: 82,
            growth_potential: 85,
            retention_score: 88,
            ai_hire_status: HireStatus::Offered,
            evaluated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_get_missing_candidate() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_update() {
        let store = MemoryStore::new();
        store.insert(completed_candidate("c1"));

        let updated = store.apply("c1", update()).await.unwrap();
        assert_eq!(updated.interview_score, Some(82));
        assert_eq!(updated.status, CandidateStatus::Completed);
        assert_eq!(updated.ai_hire_status, Some(HireStatus::Offered));
        assert!(updated.evaluated_at.is_some());
    }

    #[tokio::test]
    async fn test_pending_evaluation_filter() {
        let store = MemoryStore::new();
        store.insert(completed_candidate("a"));
        store.insert(Candidate::new("b", "No Interview Yet"));

        let mut scored = completed_candidate("c");
        scored.interview_score = Some(75);
        store.insert(scored);

        let pending = store.pending_evaluation().await.unwrap();
        assert_eq!(pending, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_pending_evaluation_is_ordered() {
        let store = MemoryStore::new();
        store.insert(completed_candidate("zeta"));
        store.insert(completed_candidate("alpha"));

        let pending = store.pending_evaluation().await.unwrap();
        assert_eq!(pending, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_effective_signals_fold_in_session_scores() {
        let mut candidate = Candidate::new("c1", "Test");
        candidate.session_evaluation = Some(SessionEvaluation {
            per_answer: vec![],
            overall: hirevet_core::OverallEvaluation {
                score: 0,
                summary: "s".to_string(),
                strengths: vec![],
                improvements: vec![],
                recommendation: "r".to_string(),
            },
        });

        // Empty session evaluation contributes nothing.
        assert!(candidate.effective_signals().answer_scores.is_empty());

        candidate.session_evaluation.as_mut().unwrap().per_answer =
            vec![hirevet_core::PerAnswerEvaluation {
                index: 0,
                score: 8,
                feedback: "ok".to_string(),
                strengths: vec![],
                improvements: vec![],
            }];
        assert_eq!(candidate.effective_signals().answer_scores, vec![8]);
    }

    #[test]
    fn test_candidate_roundtrips_through_json() {
        let mut candidate = completed_candidate("c1");
        candidate.assigned_template = Some(Template {
            name: "Backend".to_string(),
            passing_score: 75,
        });

        let json = serde_json::to_string(&candidate).unwrap();
        let parsed: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.passing_threshold(), Some(75));
        assert!(parsed.is_pending_evaluation());
    }

    #[test]
    fn test_update_from_failed_result_records_rejection() {
        let result = EvaluationResult {
            interview_score: 40,
            growth_potential: 85,
            retention_score: 88,
            passed: false,
            verdict: hirevet_core::Verdict::Reject,
            evaluated_at: Utc::now(),
        };

        let update = EvaluationUpdate::from_result(&result);
        assert_eq!(update.ai_hire_status, HireStatus::Rejected);
    }
}
