//! # hirevet-runtime
//!
//! The evaluation pipeline's runtime: reasoning providers, the response
//! evaluator, persistence, notification dispatch, and sweep scheduling.
//!
//! `hirevet-core` owns every deterministic rule; this crate owns every
//! side effect. The seams are explicit traits ([`ReasoningProvider`],
//! [`CandidateStore`], [`LetterService`], [`EmailService`]) so tests and
//! alternative backends plug in without touching the pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! answers -> ResponseEvaluator -> SessionEvaluation   (provider or heuristic)
//! signals -> EvaluationOrchestrator -> persisted EvaluationResult
//!                                   -> offer/rejection letter + email
//! ```
//!
//! ## Guarantees
//!
//! - `ResponseEvaluator::evaluate` never fails; provider trouble degrades
//!   to the deterministic heuristic
//! - evaluation is idempotent per candidate; re-evaluation requires the
//!   explicit recalculate operation, which never re-sends letters
//! - persistence happens-before notification; notification failures never
//!   roll back a persisted result
//! - batch sweeps are sequential, throttled, isolated per candidate, and
//!   never overlap

pub mod config;
pub mod evaluator;
pub mod notify;
pub mod orchestrator;
pub mod providers;
pub mod scheduler;
pub mod store;

// Re-export main types at crate root
pub use config::RuntimeConfig;
pub use evaluator::ResponseEvaluator;
pub use notify::{EmailService, LetterService, LogMailer, NotifyError, TextLetterWriter};
pub use orchestrator::{
    BatchError, BatchReport, EvaluationOrchestrator, EvaluationOrchestratorBuilder,
    EvaluationOutcome, OrchestratorError,
};
pub use providers::{
    ApiCredential, CompletionConfig, CredentialSource, ProviderChain, ProviderError,
    ReasoningProvider,
};
pub use scheduler::SweepScheduler;
pub use store::{
    Candidate, CandidateStatus, CandidateStore, EvaluationUpdate, HireStatus, MemoryStore,
    StoreError, Template,
};
