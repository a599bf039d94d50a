//! Encyclopedia search and page lookup.
//!
//! The core only sees the [`KnowledgeSource`] capability: ranked title search,
//! exact summary lookup, and full-content lookup. [`WikipediaSource`] implements
//! it against the MediaWiki action API.

mod wikipedia;

use async_trait::async_trait;

use topicbrief_shared::{PageResult, Result};

pub use wikipedia::{WikipediaOptions, WikipediaSource};

/// Search/fetch capability over an encyclopedia.
///
/// Implementations hold no per-request state and are shared across requests.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Ranked candidate titles for `keyword`, at most `limit` of them.
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<String>>;

    /// Exact lookup (no suggestion, no redirect) of a page's URL and
    /// two-sentence summary.
    async fn fetch_summary(&self, title: &str) -> Result<PageResult>;

    /// Full plain-text body of a page.
    async fn fetch_full_content(&self, title: &str) -> Result<String>;
}
