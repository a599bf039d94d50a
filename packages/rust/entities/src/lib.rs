//! Named-entity recognition collaborators.
//!
//! Provides:
//! - [`EntityRecognizer`] — the `recognize(text) -> spans` capability
//! - [`HttpRecognizer`] — a remote NER service client
//! - [`PatternRecognizer`] — an offline regex recognizer for dates, money and percentages
//! - [`RecognizerHandle`] — an explicit available/unavailable wrapper built from config

mod http;
mod pattern;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use topicbrief_shared::{EntitiesConfig, EntityBackend, EntitySpan, Result};

pub use http::HttpRecognizer;
pub use pattern::PatternRecognizer;

/// Entity recognition capability.
///
/// Returned spans use character offsets into `text`, in ascending order.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Short backend name, for logs.
    fn name(&self) -> &str;

    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// A recognizer that may or may not be usable.
#[derive(Clone)]
pub enum RecognizerHandle {
    Available(Arc<dyn EntityRecognizer>),
    Unavailable { reason: String },
}

impl RecognizerHandle {
    pub fn available(recognizer: impl EntityRecognizer + 'static) -> Self {
        Self::Available(Arc::new(recognizer))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Build the configured recognizer; construction failures degrade to
    /// `Unavailable` so annotation becomes a passthrough.
    pub fn from_config(config: &EntitiesConfig) -> Self {
        match config.backend {
            EntityBackend::Pattern => Self::available(PatternRecognizer::new()),
            EntityBackend::Disabled => Self::unavailable("entity recognition disabled in config"),
            EntityBackend::Http => {
                let Some(endpoint) = config.endpoint.as_deref() else {
                    warn!("http recognizer selected without an endpoint");
                    return Self::unavailable("entities.endpoint is not set");
                };
                match HttpRecognizer::new(endpoint, config.timeout_secs) {
                    Ok(recognizer) => Self::available(recognizer),
                    Err(e) => {
                        warn!(error = %e, "entity recognizer disabled");
                        Self::unavailable(e.to_string())
                    }
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl std::fmt::Debug for RecognizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(r) => f.debug_tuple("Available").field(&r.name()).finish(),
            Self::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}
