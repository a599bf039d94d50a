//! In-memory collaborator stubs for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use topicbrief_entities::EntityRecognizer;
use topicbrief_llm::{CompletionParams, LanguageModel};
use topicbrief_shared::{EntitySpan, PageResult, Result, TopicBriefError};
use topicbrief_sources::KnowledgeSource;

/// Knowledge source with scripted candidates and per-title failures.
pub(crate) struct StubSource {
    candidates: Vec<String>,
    failing: HashSet<String>,
    full_content: Option<String>,
    search_fails: bool,
    pub(crate) summary_calls: Mutex<Vec<String>>,
    pub(crate) full_content_calls: Mutex<Vec<String>>,
}

impl StubSource {
    /// Candidates `"<prefix> 1"`, `"<prefix> 2"`, ...
    pub(crate) fn numbered(prefix: &str, count: usize) -> Self {
        Self::with_titles((1..=count).map(|i| format!("{prefix} {i}")).collect())
    }

    pub(crate) fn with_titles(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            failing: HashSet::new(),
            full_content: Some("Full article text.".into()),
            search_fails: false,
            summary_calls: Mutex::new(Vec::new()),
            full_content_calls: Mutex::new(Vec::new()),
        }
    }

    /// Make `fetch_summary` fail for these titles.
    pub(crate) fn failing(mut self, titles: &[&str]) -> Self {
        self.failing.extend(titles.iter().map(|t| t.to_string()));
        self
    }

    /// `None` makes `fetch_full_content` fail.
    pub(crate) fn full_content(mut self, content: Option<&str>) -> Self {
        self.full_content = content.map(String::from);
        self
    }

    pub(crate) fn search_fails(mut self) -> Self {
        self.search_fails = true;
        self
    }

    pub(crate) fn summary_calls(&self) -> Vec<String> {
        self.summary_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeSource for StubSource {
    async fn search(&self, _keyword: &str, limit: usize) -> Result<Vec<String>> {
        if self.search_fails {
            return Err(TopicBriefError::Network("search unavailable".into()));
        }
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }

    async fn fetch_summary(&self, title: &str) -> Result<PageResult> {
        self.summary_calls.lock().unwrap().push(title.to_string());
        if self.failing.contains(title) {
            return Err(TopicBriefError::Disambiguation {
                title: title.to_string(),
            });
        }
        Ok(PageResult {
            title: title.to_string(),
            url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            summary: format!("{title} is a page. It has two sentences."),
        })
    }

    async fn fetch_full_content(&self, title: &str) -> Result<String> {
        self.full_content_calls.lock().unwrap().push(title.to_string());
        self.full_content.clone().ok_or_else(|| TopicBriefError::NotFound {
            title: title.to_string(),
        })
    }
}

/// Model returning a fixed reply or a fixed error; records prompts.
pub(crate) struct StubModel {
    reply: std::result::Result<String, String>,
    pub(crate) prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, prompt: &str, _params: CompletionParams) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(TopicBriefError::Model)
    }
}

/// Recognizer returning fixed spans, or failing.
pub(crate) struct StubRecognizer {
    spans: Option<Vec<EntitySpan>>,
}

impl StubRecognizer {
    pub(crate) fn returning(spans: Vec<EntitySpan>) -> Self {
        Self { spans: Some(spans) }
    }

    pub(crate) fn failing() -> Self {
        Self { spans: None }
    }
}

#[async_trait]
impl EntityRecognizer for StubRecognizer {
    fn name(&self) -> &str {
        "stub"
    }

    async fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
        self.spans
            .clone()
            .ok_or_else(|| TopicBriefError::Recognizer("model not loaded".into()))
    }
}
