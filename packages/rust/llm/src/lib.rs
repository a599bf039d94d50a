//! Language model capability and clients.
//!
//! The synthesizer talks to a [`ModelHandle`], which is either an available
//! [`LanguageModel`] or an explicit `Unavailable` marker carrying the reason.
//! Call sites match on the handle instead of checking a nullable global.

mod chat;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use topicbrief_shared::{LlmConfig, Result, resolve_api_key};

pub use chat::ChatCompletionsModel;

/// Sampling parameters for a single completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Text completion capability.
///
/// Implementations must be stateless per request so one handle can serve
/// concurrent requests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs.
    fn name(&self) -> &str;

    /// Complete `prompt` and return the raw reply text.
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String>;
}

/// A model that may or may not be usable.
#[derive(Clone)]
pub enum ModelHandle {
    Available(Arc<dyn LanguageModel>),
    Unavailable { reason: String },
}

impl ModelHandle {
    /// Wrap a concrete model.
    pub fn available(model: impl LanguageModel + 'static) -> Self {
        Self::Available(Arc::new(model))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Build the configured chat-completions model.
    ///
    /// A missing API key or a client that cannot be built degrades to
    /// `Unavailable`; the pipeline still runs with templated synthesis.
    pub fn from_config(config: &LlmConfig) -> Self {
        let Some(api_key) = resolve_api_key(config) else {
            let reason = format!("environment variable {} is not set", config.api_key_env);
            warn!(%reason, "language model disabled");
            return Self::unavailable(reason);
        };

        match ChatCompletionsModel::new(config, api_key) {
            Ok(model) => Self::available(model),
            Err(e) => {
                warn!(error = %e, "language model disabled");
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(model) => f.debug_tuple("Available").field(&model.name()).finish(),
            Self::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}

/// Send a tiny completion to verify the model answers at all.
pub async fn probe(model: &dyn LanguageModel) -> Result<String> {
    let params = CompletionParams {
        max_tokens: 10,
        temperature: 0.3,
    };
    model.complete("Hello, are you working?", params).await
}
