//! Response evaluator: session in, trustworthy evaluation out.
//!
//! The evaluator builds one prompt for the whole session and attempts each
//! configured provider in priority order. The first usable response wins;
//! an error, a timeout, or unrecoverable JSON advances to the next
//! provider, and exhaustion falls through to the deterministic heuristic
//! scorer. Provider failures never escape this module: `evaluate` always
//! returns a usable, range-safe result.
//!
//! No provider is ever retried. Failure means "move on", not "try again":
//! the heuristic fallback is cheap and deterministic.

use hirevet_core::{heuristic, InterviewSession, SessionEvaluation};

use crate::providers::{CompletionConfig, ProviderChain};

mod normalize;
mod prompts;
mod repair;

pub use normalize::normalize_evaluation;
pub use prompts::{build_session_prompt, EVALUATOR_SYSTEM_PROMPT};
pub use repair::{extract_json, RepairError};

/// Evaluates interview sessions with provider assistance and a
/// deterministic fallback.
#[derive(Debug, Clone)]
pub struct ResponseEvaluator {
    chain: ProviderChain,
    config: CompletionConfig,
}

impl ResponseEvaluator {
    /// Create an evaluator over a provider chain.
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain,
            config: CompletionConfig::default(),
        }
    }

    /// Override the completion configuration.
    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluate a session. Infallible by contract.
    ///
    /// # Execution Flow
    /// 1. Build one prompt embedding the whole session
    /// 2. Try each provider once, in priority order, under a timeout
    /// 3. Repair and normalize the first usable response
    /// 4. Fall back to the heuristic scorer when the chain is exhausted
    pub async fn evaluate(&self, session: &InterviewSession) -> SessionEvaluation {
        if self.chain.is_empty() {
            tracing::debug!("no providers configured, using heuristic scorer");
            return heuristic::evaluate_session(session);
        }

        let prompt = build_session_prompt(session);

        for provider in self.chain.iter() {
            let attempt =
                tokio::time::timeout(self.config.timeout, provider.complete(&prompt, &self.config))
                    .await;

            let raw = match attempt {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider call failed");
                    continue;
                }
                Err(_) => {
                    tracing::warn!(
                        provider = provider.name(),
                        timeout = ?self.config.timeout,
                        "provider call timed out"
                    );
                    continue;
                }
            };

            match extract_json(&raw) {
                Ok(value) => {
                    tracing::debug!(provider = provider.name(), "provider evaluation accepted");
                    return normalize_evaluation(&value, session.len());
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "malformed provider response"
                    );
                    continue;
                }
            }
        }

        tracing::info!("all providers exhausted, using heuristic scorer");
        heuristic::evaluate_session(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderError, ReasoningProvider};
    use async_trait::async_trait;
    use hirevet_core::{Answer, Difficulty, Question, SessionEntry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct ScriptedProvider {
        name: &'static str,
        response: Result<&'static str, ()>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn ok(name: &'static str, response: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                response: Ok(response),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                response: Err(()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReasoningProvider for ScriptedProvider {
        async fn complete(
            &self,
            _prompt: &str,
            _config: &CompletionConfig,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.response {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(ProviderError::Http("connection refused".to_string())),
            }
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn session(answers: &[&str]) -> InterviewSession {
        InterviewSession::new(
            answers
                .iter()
                .map(|text| SessionEntry {
                    question: Question {
                        text: "Explain the borrow checker.".to_string(),
                        difficulty: Difficulty::Easy,
                    },
                    answer: Answer {
                        text: text.to_string(),
                        time_spent: 30,
                        is_auto_submitted: false,
                    },
                })
                .collect(),
        )
    }

    const VALID_NO_OVERALL_SCORE: &str = r#"{
        "perAnswer": [
            {"index": 0, "score": 8, "feedback": "Good"},
            {"index": 1, "score": 6, "feedback": "Fair"},
            {"index": 2, "score": 7, "feedback": "Fine"}
        ],
        "overall": {"summary": "Reasonable session"}
    }"#;

    #[tokio::test]
    async fn test_primary_provider_wins() {
        let primary = ScriptedProvider::ok("primary", VALID_NO_OVERALL_SCORE);
        let secondary = ScriptedProvider::ok("secondary", r#"{"overall": {"score": 1}}"#);
        let evaluator = ResponseEvaluator::new(ProviderChain::new(vec![
            primary.clone() as Arc<dyn ReasoningProvider>,
            secondary.clone(),
        ]));

        let eval = evaluator.evaluate(&session(&["a", "b", "c"])).await;

        // Overall derived from [8, 6, 7]: round(7.0 * 10) = 70.
        assert_eq!(eval.overall.score, 70);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_advances_to_next_provider() {
        let primary = ScriptedProvider::failing("primary");
        let secondary = ScriptedProvider::ok(
            "secondary",
            r#"{"perAnswer": [{"index": 0, "score": 9, "feedback": "Sharp"}], "overall": {"score": 90}}"#,
        );
        let evaluator = ResponseEvaluator::new(ProviderChain::new(vec![
            primary.clone() as Arc<dyn ReasoningProvider>,
            secondary.clone(),
        ]));

        let eval = evaluator.evaluate(&session(&["answer"])).await;

        assert_eq!(eval.overall.score, 90);
        // The failed provider was attempted exactly once - no retries.
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_garbage_response_advances_to_next_provider() {
        let primary = ScriptedProvider::ok("primary", "I refuse to answer in JSON.");
        let secondary =
            ScriptedProvider::ok("secondary", r#"{"overall": {"score": 40, "summary": "ok"}}"#);
        let evaluator = ResponseEvaluator::new(ProviderChain::new(vec![
            primary.clone() as Arc<dyn ReasoningProvider>,
            secondary.clone(),
        ]));

        let eval = evaluator.evaluate(&session(&["answer"])).await;

        assert_eq!(eval.overall.score, 40);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_falls_back_to_heuristic() {
        let first = ScriptedProvider::failing("first");
        let second = ScriptedProvider::failing("second");
        let evaluator =
            ResponseEvaluator::new(ProviderChain::new(vec![first.clone() as Arc<dyn ReasoningProvider>, second.clone()]));

        // Five words, easy, not auto-submitted: heuristic scores 2.
        let eval = evaluator
            .evaluate(&session(&["short answer of five words"]))
            .await;

        assert_eq!(eval.per_answer[0].score, 2);
        assert_eq!(eval.per_answer[0].feedback, "Very brief answer, needs more detail");
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_goes_straight_to_heuristic() {
        let evaluator = ResponseEvaluator::new(ProviderChain::empty());

        let eval = evaluator
            .evaluate(&session(&["short answer of five words"]))
            .await;

        assert_eq!(eval.per_answer[0].score, 2);
        assert_eq!(eval.overall.score, 20);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out_and_advances() {
        struct SlowProvider;

        #[async_trait]
        impl ReasoningProvider for SlowProvider {
            async fn complete(
                &self,
                _prompt: &str,
                _config: &CompletionConfig,
            ) -> Result<String, ProviderError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("{}".to_string())
            }

            fn name(&self) -> &str {
                "slow"
            }
        }

        let fallback =
            ScriptedProvider::ok("fast", r#"{"overall": {"score": 33, "summary": "ok"}}"#);
        let evaluator = ResponseEvaluator::new(ProviderChain::new(vec![
            Arc::new(SlowProvider) as Arc<dyn ReasoningProvider>,
            fallback.clone(),
        ]))
        .with_config(CompletionConfig {
            timeout: Duration::from_millis(50),
            ..Default::default()
        });

        let eval = evaluator.evaluate(&session(&["answer"])).await;

        assert_eq!(eval.overall.score, 33);
        assert_eq!(fallback.call_count(), 1);
    }

    #[tokio::test]
    async fn test_never_fails_for_any_session() {
        let evaluator = ResponseEvaluator::new(ProviderChain::new(vec![
            ScriptedProvider::failing("a") as Arc<dyn ReasoningProvider>,
            ScriptedProvider::ok("b", "not json at all"),
        ]));

        let eval = evaluator.evaluate(&session(&[])).await;
        assert!(eval.per_answer.is_empty());
        assert_eq!(eval.overall.score, 0);
    }
}
