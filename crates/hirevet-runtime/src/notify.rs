//! Notification collaborators: letter generation and email dispatch.
//!
//! Both are best-effort from the orchestrator's point of view: a failure
//! here is logged and never rolls back an already-persisted evaluation.
//! The traits are the contract; the bundled implementations are a
//! plain-text letter writer and a logging mailer, which is all the
//! pipeline itself owns. PDF rendering and SMTP transport live elsewhere
//! and implement the same traits.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::Candidate;

/// Errors from letter generation or email dispatch.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("letter generation failed: {0}")]
    Letter(String),

    #[error("email dispatch failed: {0}")]
    Email(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Generates decision letters for candidates.
#[async_trait]
pub trait LetterService: Send + Sync {
    /// Generate an offer letter; returns a handle to the artifact.
    async fn generate_offer(&self, candidate: &Candidate) -> Result<PathBuf, NotifyError>;

    /// Generate a rejection letter; returns a handle to the artifact.
    async fn generate_rejection(&self, candidate: &Candidate) -> Result<PathBuf, NotifyError>;
}

/// Sends decision emails with a letter attached.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_offer(&self, candidate: &Candidate, letter: &Path) -> Result<(), NotifyError>;

    async fn send_rejection(&self, candidate: &Candidate, letter: &Path)
        -> Result<(), NotifyError>;
}

/// Writes plain-text decision letters into a directory.
pub struct TextLetterWriter {
    output_dir: PathBuf,
    company_name: String,
}

impl TextLetterWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            company_name: "Hirevet".to_string(),
        }
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = name.into();
        self
    }

    fn write_letter(
        &self,
        candidate: &Candidate,
        kind: &str,
        body: String,
    ) -> Result<PathBuf, NotifyError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let safe_name: String = candidate
            .name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        let file_name = format!(
            "{}_letter_{}_{}.txt",
            kind,
            safe_name,
            Utc::now().timestamp_millis()
        );
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, body)?;

        tracing::debug!(path = %path.display(), "letter written");
        Ok(path)
    }

    fn offer_body(&self, candidate: &Candidate) -> String {
        let role = candidate.applied_for.as_deref().unwrap_or("the open role");
        let score_line = candidate
            .interview_score
            .map(|score| format!("Interview performance: {}/100\n", score))
            .unwrap_or_default();

        format!(
            "{company}\n\
             Date: {date}\n\n\
             Dear {name},\n\n\
             We are delighted to extend an offer of employment for {role},\n\
             based on your performance in our interview process.\n\n\
             {score_line}\n\
             We look forward to welcoming you to the team.\n\n\
             Sincerely,\n\
             {company} Hiring\n",
            company = self.company_name,
            date = Utc::now().format("%B %e, %Y"),
            name = candidate.name,
            role = role,
            score_line = score_line,
        )
    }

    fn rejection_body(&self, candidate: &Candidate) -> String {
        let role = candidate.applied_for.as_deref().unwrap_or("the open role");

        format!(
            "{company}\n\
             Date: {date}\n\n\
             Dear {name},\n\n\
             Thank you for taking the time to interview for {role}.\n\
             After careful consideration, we will not be moving forward\n\
             with your application at this time.\n\n\
             We encourage you to apply again in the future.\n\n\
             Sincerely,\n\
             {company} Hiring\n",
            company = self.company_name,
            date = Utc::now().format("%B %e, %Y"),
            name = candidate.name,
            role = role,
        )
    }
}

#[async_trait]
impl LetterService for TextLetterWriter {
    async fn generate_offer(&self, candidate: &Candidate) -> Result<PathBuf, NotifyError> {
        self.write_letter(candidate, "offer", self.offer_body(candidate))
    }

    async fn generate_rejection(&self, candidate: &Candidate) -> Result<PathBuf, NotifyError> {
        self.write_letter(candidate, "rejection", self.rejection_body(candidate))
    }
}

/// A mailer that records sends in the log instead of a transport.
///
/// Stands in wherever a real SMTP transport is not wired up; the
/// orchestrator treats it like any other [`EmailService`].
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl EmailService for LogMailer {
    async fn send_offer(&self, candidate: &Candidate, letter: &Path) -> Result<(), NotifyError> {
        tracing::info!(
            candidate = %candidate.id,
            email = candidate.email.as_deref().unwrap_or("<none>"),
            letter = %letter.display(),
            "offer email dispatched"
        );
        Ok(())
    }

    async fn send_rejection(
        &self,
        candidate: &Candidate,
        letter: &Path,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            candidate = %candidate.id,
            email = candidate.email.as_deref().unwrap_or("<none>"),
            letter = %letter.display(),
            "rejection email dispatched"
        );
        Ok(())
    }
}
