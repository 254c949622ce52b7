//! Reasoning provider abstractions.
//!
//! This module defines the uniform call surface over external reasoning
//! providers: send a prompt, get raw text back, within a timeout. Providers
//! know nothing about evaluation semantics: no retries, no interpretation
//! of content. Priority between providers is fixed at startup by the
//! [`ProviderChain`]; a provider without credentials is removed from the
//! chain then, never per-call.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod secrets;

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "openai")]
mod openai;

pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiProvider, GEMINI_API_KEY_ENV};

#[cfg(feature = "openai")]
pub use openai::{OpenAiProvider, OPENAI_API_KEY_ENV};

/// Errors from reasoning providers.
///
/// Callers treat every variant the same way: advance to the next provider
/// in the chain, ultimately to the heuristic scorer. None of these are
/// retried against the same provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for a completion request.
///
/// Shared across every provider in the chain; the model choice is owned by
/// each provider.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.3,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Uniform call surface over an external reasoning provider.
///
/// Stateless: one call, one response, no retries. A timeout is reported as
/// [`ProviderError::Timeout`] and treated identically to any other failure.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Send a prompt and return the raw response text.
    async fn complete(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> Result<String, ProviderError>;

    /// Provider name for logs and metrics.
    fn name(&self) -> &str;
}

/// Ordered list of providers, tried first to last.
///
/// Built once at startup: [`ProviderChain::from_env`] probes each known
/// credential and registers only the providers that have one, in fixed
/// priority order. An empty chain is legal; evaluation then goes straight
/// to the heuristic scorer.
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn ReasoningProvider>>,
}

impl ProviderChain {
    /// Build a chain from an explicit provider list, in priority order.
    pub fn new(providers: Vec<Arc<dyn ReasoningProvider>>) -> Self {
        Self { providers }
    }

    /// An empty chain; every evaluation falls back to the heuristic.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Probe the environment and register available providers.
    ///
    /// Priority order is fixed: Gemini, then OpenAI. Credential absence
    /// removes a provider here, at startup, never per-call.
    pub fn from_env() -> Self {
        #[allow(unused_mut)]
        let mut providers: Vec<Arc<dyn ReasoningProvider>> = Vec::new();

        #[cfg(feature = "gemini")]
        match GeminiProvider::from_env() {
            Ok(provider) => {
                tracing::info!(provider = provider.name(), "registered reasoning provider");
                providers.push(Arc::new(provider));
            }
            Err(e) => tracing::debug!(error = %e, "gemini provider not registered"),
        }

        #[cfg(feature = "openai")]
        match OpenAiProvider::from_env() {
            Ok(provider) => {
                tracing::info!(provider = provider.name(), "registered reasoning provider");
                providers.push(Arc::new(provider));
            }
            Err(e) => tracing::debug!(error = %e, "openai provider not registered"),
        }

        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Providers in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ReasoningProvider>> {
        self.providers.iter()
    }

    /// Provider names in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("providers", &self.names())
            .finish()
    }
}
