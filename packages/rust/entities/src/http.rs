//! Client for a remote NER service (e.g. a spaCy model behind a small HTTP wrapper).
//!
//! Request: `POST {endpoint}` with `{"text": "..."}`.
//! Response: `{"entities": [{"start": 0, "end": 5, "label": "GPE", "text": "Paris"}]}`;
//! `ents`, `start_char` and `end_char` are accepted as aliases.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use topicbrief_shared::{EntitySpan, Result, TopicBriefError};

use crate::EntityRecognizer;

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(alias = "ents", default)]
    entities: Vec<WireEntity>,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    #[serde(alias = "start_char")]
    start: usize,
    #[serde(alias = "end_char")]
    end: usize,
    label: String,
    #[serde(default)]
    text: Option<String>,
}

/// [`EntityRecognizer`] backed by an HTTP service.
#[derive(Debug, Clone)]
pub struct HttpRecognizer {
    client: Client,
    endpoint: String,
}

impl HttpRecognizer {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TopicBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl EntityRecognizer for HttpRecognizer {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint, chars = text.len()))]
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RecognizeRequest { text })
            .send()
            .await
            .map_err(|e| TopicBriefError::Recognizer(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicBriefError::Recognizer(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| TopicBriefError::Recognizer(format!("invalid response: {e}")))?;

        let mut spans: Vec<EntitySpan> = body
            .entities
            .into_iter()
            .map(|e| {
                let text = e.text.unwrap_or_else(|| {
                    text.chars().skip(e.start).take(e.end.saturating_sub(e.start)).collect()
                });
                EntitySpan::new(e.start, e.end, e.label, text)
            })
            .collect();
        spans.sort_by_key(|s| s.start);

        debug!(count = spans.len(), "entities recognized");
        Ok(spans)
    }
}
