//! Evaluation orchestrator: persistence and side-effect authority.
//!
//! The orchestrator is the only component that writes evaluation fields
//! and the only one that dispatches letters and email. It enforces:
//!
//! - **Idempotency**: a candidate with an existing interview score is
//!   skipped without touching the aggregator or any collaborator
//! - **Ordering**: persistence always happens-before notification
//!   dispatch for a given candidate
//! - **Isolation**: one candidate's failure never stops a batch sweep
//! - **Exclusion**: two sweeps never run concurrently
//!
//! Collaborators are injected explicitly; lifecycle is owned by the
//! process entry point, not by module-load side effects.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use hirevet_core::{CompositeAggregator, EvaluationResult, ScoringConfig};

use crate::notify::{EmailService, LetterService, LogMailer, TextLetterWriter};
use crate::store::{Candidate, CandidateStore, EvaluationUpdate, StoreError};

/// Errors from the orchestrator.
///
/// Only persistence problems surface here; provider and notification
/// failures are recovered or logged downstream.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("candidate not found: {0}")]
    CandidateNotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("orchestrator not configured: {0}")]
    NotConfigured(String),
}

/// Outcome of a single-candidate evaluation request.
#[derive(Debug, Clone)]
pub enum EvaluationOutcome {
    /// A fresh evaluation was computed and persisted
    Evaluated(EvaluationResult),

    /// The candidate already had a score; nothing was done
    Skipped,
}

impl EvaluationOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, EvaluationOutcome::Skipped)
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        match self {
            EvaluationOutcome::Evaluated(result) => Some(result),
            EvaluationOutcome::Skipped => None,
        }
    }
}

/// One failed candidate within a batch sweep.
#[derive(Debug)]
pub struct BatchError {
    pub candidate_id: String,
    pub error: OrchestratorError,
}

/// Result of a batch sweep.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Candidates freshly evaluated
    pub evaluated: usize,

    /// Candidates skipped by the idempotency check
    pub skipped: usize,

    /// Per-candidate failures; the sweep continued past each
    pub errors: Vec<BatchError>,
}

/// The evaluation orchestrator.
pub struct EvaluationOrchestrator {
    store: Arc<dyn CandidateStore>,
    letters: Arc<dyn LetterService>,
    mailer: Arc<dyn EmailService>,
    aggregator: CompositeAggregator,
    inter_candidate_delay: Duration,

    /// Held for the duration of a sweep; `try_lock` failure means a sweep
    /// is already in flight and this invocation must not run.
    sweep_guard: tokio::sync::Mutex<()>,
}

impl EvaluationOrchestrator {
    pub fn builder() -> EvaluationOrchestratorBuilder {
        EvaluationOrchestratorBuilder::new()
    }

    /// Evaluate one candidate on demand.
    ///
    /// # Execution Flow
    /// 1. Load candidate and assigned template (read-only)
    /// 2. Idempotency check: an existing score returns `Skipped`
    /// 3. Aggregate signals into a decision record
    /// 4. Persist the record (fatal on failure)
    /// 5. Dispatch exactly one of offer or rejection, best-effort
    pub async fn evaluate_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<EvaluationOutcome, OrchestratorError> {
        let candidate = self.load(candidate_id).await?;

        if candidate.interview_score.is_some() {
            tracing::debug!(candidate = candidate_id, "already evaluated, skipping");
            return Ok(EvaluationOutcome::Skipped);
        }

        let result = self
            .aggregator
            .aggregate(&candidate.effective_signals(), candidate.passing_threshold());

        // Persist before any notification; a store failure aborts here.
        let updated = self
            .store
            .apply(candidate_id, EvaluationUpdate::from_result(&result))
            .await?;

        tracing::info!(
            candidate = candidate_id,
            score = result.interview_score,
            passed = result.passed,
            verdict = %result.verdict,
            "evaluation persisted"
        );

        self.dispatch_notification(&updated, result.passed).await;

        Ok(EvaluationOutcome::Evaluated(result))
    }

    /// Recompute scores for an already-evaluated candidate.
    ///
    /// Bypasses the idempotency check and overwrites the persisted scores.
    /// Never dispatches letters or email - recalculation is a correction,
    /// not a decision event.
    pub async fn recalculate(
        &self,
        candidate_id: &str,
    ) -> Result<EvaluationResult, OrchestratorError> {
        let candidate = self.load(candidate_id).await?;

        let result = self
            .aggregator
            .aggregate(&candidate.effective_signals(), candidate.passing_threshold());

        self.store
            .apply(candidate_id, EvaluationUpdate::from_result(&result))
            .await?;

        tracing::info!(
            candidate = candidate_id,
            score = result.interview_score,
            "recalculated without notification"
        );

        Ok(result)
    }

    /// Sweep all pending candidates sequentially.
    ///
    /// Candidates are processed one at a time with a fixed delay between
    /// them - deliberate throttling of provider and email usage, not a
    /// performance concern. A failure on one candidate is recorded and the
    /// sweep continues. If another sweep is already in flight this one
    /// returns an empty report immediately.
    pub async fn process_pending(&self) -> Result<BatchReport, OrchestratorError> {
        let _guard = match self.sweep_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("sweep already in flight, skipping this invocation");
                return Ok(BatchReport::default());
            }
        };

        let pending = self.store.pending_evaluation().await?;
        tracing::info!(count = pending.len(), "processing pending candidates");

        let mut report = BatchReport::default();

        for candidate_id in pending {
            match self.evaluate_candidate(&candidate_id).await {
                Ok(EvaluationOutcome::Evaluated(_)) => report.evaluated += 1,
                Ok(EvaluationOutcome::Skipped) => report.skipped += 1,
                Err(error) => {
                    tracing::error!(
                        candidate = %candidate_id,
                        error = %error,
                        "evaluation failed, continuing sweep"
                    );
                    report.errors.push(BatchError {
                        candidate_id,
                        error,
                    });
                }
            }

            tokio::time::sleep(self.inter_candidate_delay).await;
        }

        tracing::info!(
            evaluated = report.evaluated,
            skipped = report.skipped,
            failed = report.errors.len(),
            "sweep complete"
        );

        Ok(report)
    }

    async fn load(&self, candidate_id: &str) -> Result<Candidate, OrchestratorError> {
        self.store.get(candidate_id).await.map_err(|e| match e {
            StoreError::NotFound(id) => OrchestratorError::CandidateNotFound(id),
            other => OrchestratorError::Store(other),
        })
    }

    /// Dispatch the letter and email for a decision. Best-effort: failures
    /// are logged and never propagate - the persisted evaluation is
    /// authoritative either way.
    async fn dispatch_notification(&self, candidate: &Candidate, passed: bool) {
        let letter = if passed {
            self.letters.generate_offer(candidate).await
        } else {
            self.letters.generate_rejection(candidate).await
        };

        let letter_path = match letter {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(
                    candidate = %candidate.id,
                    error = %e,
                    "letter generation failed, skipping email"
                );
                return;
            }
        };

        let sent = if passed {
            self.mailer.send_offer(candidate, &letter_path).await
        } else {
            self.mailer.send_rejection(candidate, &letter_path).await
        };

        if let Err(e) = sent {
            tracing::error!(candidate = %candidate.id, error = %e, "email dispatch failed");
        }
    }
}

/// Builder for [`EvaluationOrchestrator`].
pub struct EvaluationOrchestratorBuilder {
    store: Option<Arc<dyn CandidateStore>>,
    letters: Option<Arc<dyn LetterService>>,
    mailer: Option<Arc<dyn EmailService>>,
    scoring: ScoringConfig,
    inter_candidate_delay: Duration,
}

impl EvaluationOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            letters: None,
            mailer: None,
            scoring: ScoringConfig::default(),
            inter_candidate_delay: Duration::from_secs(1),
        }
    }

    /// Set the candidate store. Required.
    pub fn store(mut self, store: Arc<dyn CandidateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the letter service. Defaults to a [`TextLetterWriter`] in
    /// `./letters`.
    pub fn letters(mut self, letters: Arc<dyn LetterService>) -> Self {
        self.letters = Some(letters);
        self
    }

    /// Set the email service. Defaults to [`LogMailer`].
    pub fn mailer(mut self, mailer: Arc<dyn EmailService>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Override the scoring configuration.
    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Delay between candidates in a batch sweep.
    pub fn inter_candidate_delay(mut self, delay: Duration) -> Self {
        self.inter_candidate_delay = delay;
        self
    }

    pub fn build(self) -> Result<EvaluationOrchestrator, OrchestratorError> {
        let store = self
            .store
            .ok_or_else(|| OrchestratorError::NotConfigured("no candidate store set".to_string()))?;

        Ok(EvaluationOrchestrator {
            store,
            letters: self
                .letters
                .unwrap_or_else(|| Arc::new(TextLetterWriter::new("letters"))),
            mailer: self.mailer.unwrap_or_else(|| Arc::new(LogMailer)),
            aggregator: CompositeAggregator::new(self.scoring),
            inter_candidate_delay: self.inter_candidate_delay,
            sweep_guard: tokio::sync::Mutex::new(()),
        })
    }
}

impl Default for EvaluationOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyError;
    use crate::store::{HireStatus, MemoryStore, Template};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts letter generations instead of writing files.
    #[derive(Default)]
    struct RecordingLetters {
        offers: AtomicUsize,
        rejections: AtomicUsize,
        fail: bool,
    }

    impl RecordingLetters {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl LetterService for RecordingLetters {
        async fn generate_offer(&self, _candidate: &Candidate) -> Result<PathBuf, NotifyError> {
            if self.fail {
                return Err(NotifyError::Letter("disk full".to_string()));
            }
            self.offers.fetch_add(1, Ordering::SeqCst);
            Ok(PathBuf::from("/tmp/offer.txt"))
        }

        async fn generate_rejection(&self, _candidate: &Candidate) -> Result<PathBuf, NotifyError> {
            if self.fail {
                return Err(NotifyError::Letter("disk full".to_string()));
            }
            self.rejections.fetch_add(1, Ordering::SeqCst);
            Ok(PathBuf::from("/tmp/rejection.txt"))
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        offers: AtomicUsize,
        rejections: AtomicUsize,
    }

    #[async_trait]
    impl EmailService for RecordingMailer {
        async fn send_offer(&self, _c: &Candidate, _l: &Path) -> Result<(), NotifyError> {
            self.offers.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_rejection(&self, _c: &Candidate, _l: &Path) -> Result<(), NotifyError> {
            self.rejections.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Store wrapper that fails writes for chosen candidates.
    struct FailingStore {
        inner: MemoryStore,
        fail_apply_for: Vec<String>,
    }

    #[async_trait]
    impl CandidateStore for FailingStore {
        async fn get(&self, id: &str) -> Result<Candidate, StoreError> {
            self.inner.get(id).await
        }

        async fn apply(&self, id: &str, update: EvaluationUpdate) -> Result<Candidate, StoreError> {
            if self.fail_apply_for.iter().any(|f| f == id) {
                return Err(StoreError::WriteFailed("injected failure".to_string()));
            }
            self.inner.apply(id, update).await
        }

        async fn pending_evaluation(&self) -> Result<Vec<String>, StoreError> {
            self.inner.pending_evaluation().await
        }
    }

    fn pending_candidate(id: &str, technical: f64) -> Candidate {
        let mut candidate = Candidate::new(id, format!("Candidate {}", id));
        candidate.interview_completed = true;
        candidate.signals.technical_score = Some(technical);
        candidate
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        letters: Arc<RecordingLetters>,
        mailer: Arc<RecordingMailer>,
        orchestrator: EvaluationOrchestrator,
    }

    fn fixture(candidates: Vec<Candidate>) -> Fixture {
        let store = Arc::new(MemoryStore::from_candidates(candidates));
        let letters = Arc::new(RecordingLetters::default());
        let mailer = Arc::new(RecordingMailer::default());
        let orchestrator = EvaluationOrchestrator::builder()
            .store(store.clone())
            .letters(letters.clone())
            .mailer(mailer.clone())
            .inter_candidate_delay(Duration::from_millis(10))
            .build()
            .unwrap();

        Fixture {
            store,
            letters,
            mailer,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_fresh_evaluation_persists_and_sends_offer() {
        let f = fixture(vec![pending_candidate("c1", 85.0)]);

        let outcome = f.orchestrator.evaluate_candidate("c1").await.unwrap();
        let result = outcome.result().expect("should evaluate");
        assert_eq!(result.interview_score, 85);
        assert!(result.passed);

        let stored = f.store.get("c1").await.unwrap();
        assert_eq!(stored.interview_score, Some(85));
        assert_eq!(stored.ai_hire_status, Some(HireStatus::Offered));
        assert_eq!(stored.status, crate::store::CandidateStatus::Completed);

        assert_eq!(f.letters.offers.load(Ordering::SeqCst), 1);
        assert_eq!(f.mailer.offers.load(Ordering::SeqCst), 1);
        assert_eq!(f.letters.rejections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_candidate_gets_rejection() {
        let f = fixture(vec![pending_candidate("c1", 40.0)]);

        let outcome = f.orchestrator.evaluate_candidate("c1").await.unwrap();
        assert!(!outcome.result().unwrap().passed);

        let stored = f.store.get("c1").await.unwrap();
        assert_eq!(stored.ai_hire_status, Some(HireStatus::Rejected));

        assert_eq!(f.letters.rejections.load(Ordering::SeqCst), 1);
        assert_eq!(f.mailer.rejections.load(Ordering::SeqCst), 1);
        assert_eq!(f.letters.offers.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_evaluation_is_skipped() {
        let f = fixture(vec![pending_candidate("c1", 85.0)]);

        let first = f.orchestrator.evaluate_candidate("c1").await.unwrap();
        assert!(!first.is_skipped());

        let second = f.orchestrator.evaluate_candidate("c1").await.unwrap();
        assert!(second.is_skipped());

        // Exactly one persisted evaluation, one notification.
        assert_eq!(f.letters.offers.load(Ordering::SeqCst), 1);
        assert_eq!(f.mailer.offers.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_scored_candidate_is_skipped_without_collaborators() {
        let mut scored = pending_candidate("c1", 90.0);
        scored.interview_score = Some(82);
        let f = fixture(vec![scored]);

        let outcome = f.orchestrator.evaluate_candidate("c1").await.unwrap();
        assert!(outcome.is_skipped());

        assert_eq!(f.letters.offers.load(Ordering::SeqCst), 0);
        assert_eq!(f.letters.rejections.load(Ordering::SeqCst), 0);
        assert_eq!(f.mailer.offers.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_candidate_is_an_error() {
        let f = fixture(vec![]);
        let result = f.orchestrator.evaluate_candidate("ghost").await;
        assert!(matches!(
            result,
            Err(OrchestratorError::CandidateNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_template_threshold_is_honored_at_boundary() {
        let mut candidate = pending_candidate("c1", 80.0);
        candidate.assigned_template = Some(Template {
            name: "Senior Backend".to_string(),
            passing_score: 80,
        });
        let f = fixture(vec![candidate]);

        let outcome = f.orchestrator.evaluate_candidate("c1").await.unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.interview_score, 80);
        assert!(result.passed);
        assert_eq!(result.verdict, hirevet_core::Verdict::Hire);
    }

    #[tokio::test]
    async fn test_recalculate_overwrites_without_notification() {
        let f = fixture(vec![pending_candidate("c1", 85.0)]);

        f.orchestrator.evaluate_candidate("c1").await.unwrap();
        assert_eq!(f.letters.offers.load(Ordering::SeqCst), 1);

        let result = f.orchestrator.recalculate("c1").await.unwrap();
        assert_eq!(result.interview_score, 85);

        // Scores rewritten, but no second letter or email.
        assert_eq!(f.letters.offers.load(Ordering::SeqCst), 1);
        assert_eq!(f.mailer.offers.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_roll_back() {
        let store = Arc::new(MemoryStore::from_candidates(vec![pending_candidate(
            "c1", 85.0,
        )]));
        let mailer = Arc::new(RecordingMailer::default());
        let orchestrator = EvaluationOrchestrator::builder()
            .store(store.clone())
            .letters(Arc::new(RecordingLetters::failing()))
            .mailer(mailer.clone())
            .build()
            .unwrap();

        // Letter generation fails, but the call still succeeds.
        let outcome = orchestrator.evaluate_candidate("c1").await.unwrap();
        assert!(!outcome.is_skipped());

        // Evaluation is persisted; email was skipped after the letter failed.
        let stored = store.get("c1").await.unwrap();
        assert_eq!(stored.interview_score, Some(85));
        assert_eq!(mailer.offers.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_prevents_notification() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::from_candidates(vec![pending_candidate("c1", 85.0)]),
            fail_apply_for: vec!["c1".to_string()],
        });
        let letters = Arc::new(RecordingLetters::default());
        let orchestrator = EvaluationOrchestrator::builder()
            .store(store)
            .letters(letters.clone())
            .mailer(Arc::new(RecordingMailer::default()))
            .build()
            .unwrap();

        let result = orchestrator.evaluate_candidate("c1").await;
        assert!(matches!(result, Err(OrchestratorError::Store(_))));

        // Persistence happens-before dispatch: nothing was sent.
        assert_eq!(letters.offers.load(Ordering::SeqCst), 0);
        assert_eq!(letters.rejections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_isolates_candidate_failures() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::from_candidates(vec![
                pending_candidate("a", 85.0),
                pending_candidate("b", 60.0),
                pending_candidate("c", 90.0),
            ]),
            fail_apply_for: vec!["b".to_string()],
        });
        let orchestrator = EvaluationOrchestrator::builder()
            .store(store.clone())
            .letters(Arc::new(RecordingLetters::default()))
            .mailer(Arc::new(RecordingMailer::default()))
            .build()
            .unwrap();

        let report = orchestrator.process_pending().await.unwrap();

        assert_eq!(report.evaluated, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].candidate_id, "b");

        // The failure on b did not stop a and c from being persisted.
        assert_eq!(store.get("a").await.unwrap().interview_score, Some(85));
        assert!(store.get("b").await.unwrap().interview_score.is_none());
        assert_eq!(store.get("c").await.unwrap().interview_score, Some(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_skips_already_scored() {
        let mut scored = pending_candidate("done", 70.0);
        scored.interview_score = Some(70);

        let f = fixture(vec![pending_candidate("fresh", 75.0)]);
        f.store.insert(scored);

        let report = f.orchestrator.process_pending().await.unwrap();
        // "done" is filtered out by the pending query itself.
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.skipped, 0);
        assert!(report.errors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_sweeps_do_not_overlap() {
        let f = fixture(vec![
            pending_candidate("a", 80.0),
            pending_candidate("b", 80.0),
            pending_candidate("c", 80.0),
        ]);

        let (first, second) =
            tokio::join!(f.orchestrator.process_pending(), f.orchestrator.process_pending());
        let (first, second) = (first.unwrap(), second.unwrap());

        // One sweep ran, the other bowed out immediately.
        assert_eq!(first.evaluated + second.evaluated, 3);
        assert!(first.evaluated == 0 || second.evaluated == 0);

        // Each candidate was evaluated exactly once.
        assert_eq!(f.letters.offers.load(Ordering::SeqCst), 3);
    }
}
