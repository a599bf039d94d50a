//! Source aggregation: keyword → bounded, ordered set of page summaries.
//!
//! Candidates are tried in the order the search returns them. A candidate
//! whose lookup fails is skipped without retry; collection stops at
//! [`MAX_RESULTS`] successes. Zero successes is a valid "no results" outcome.

use tracing::{debug, info, instrument, warn};

use topicbrief_shared::{AggregationOutcome, PageResult};
use topicbrief_sources::KnowledgeSource;

use crate::pipeline::{ProgressReporter, SilentProgress};

/// Candidates requested from the search.
pub const MAX_ATTEMPTS: usize = 15;

/// Successful pages collected at most.
pub const MAX_RESULTS: usize = 8;

/// Aggregate sources for `keyword` without progress reporting.
pub async fn aggregate(source: &dyn KnowledgeSource, keyword: &str) -> AggregationOutcome {
    aggregate_with_progress(source, keyword, &SilentProgress).await
}

/// Aggregate sources for `keyword`, reporting each collected page.
#[instrument(skip_all, fields(keyword = %keyword))]
pub async fn aggregate_with_progress(
    source: &dyn KnowledgeSource,
    keyword: &str,
    progress: &dyn ProgressReporter,
) -> AggregationOutcome {
    let candidates = match source.search(keyword, MAX_ATTEMPTS).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(error = %e, "search failed, treating as no results");
            return AggregationOutcome::empty();
        }
    };

    let mut pages: Vec<PageResult> = Vec::with_capacity(MAX_RESULTS);
    let mut attempted = 0usize;

    for title in candidates.iter().take(MAX_ATTEMPTS) {
        attempted += 1;
        match source.fetch_summary(title).await {
            Ok(page) => {
                pages.push(page);
                progress.source_fetched(title, pages.len(), MAX_RESULTS);
                if pages.len() >= MAX_RESULTS {
                    break;
                }
            }
            Err(e) if e.is_lookup_miss() => {
                debug!(%title, error = %e, "skipping candidate");
            }
            Err(e) => {
                warn!(%title, error = %e, "candidate fetch failed, skipping");
            }
        }
    }

    info!(
        candidates = candidates.len(),
        attempted,
        collected = pages.len(),
        "aggregation complete"
    );

    if pages.is_empty() {
        return AggregationOutcome::empty();
    }

    let rich_context = rich_context(source, &pages).await;

    AggregationOutcome {
        pages,
        rich_context,
    }
}

/// Full text of the first page, falling back to all summaries joined.
async fn rich_context(source: &dyn KnowledgeSource, pages: &[PageResult]) -> String {
    let first = &pages[0].title;
    match source.fetch_full_content(first).await {
        Ok(content) if !content.trim().is_empty() => content,
        Ok(_) => joined_summaries(pages),
        Err(e) => {
            warn!(title = %first, error = %e, "full content unavailable, using summaries");
            joined_summaries(pages)
        }
    }
}

fn joined_summaries(pages: &[PageResult]) -> String {
    pages
        .iter()
        .map(|p| p.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubSource;

    #[tokio::test]
    async fn stops_after_max_results() {
        let source = StubSource::numbered("Topic", 15);
        let outcome = aggregate(&source, "Topic").await;

        assert_eq!(outcome.len(), MAX_RESULTS);
        let expected: Vec<String> = (1..=8).map(|i| format!("Topic {i}")).collect();
        assert_eq!(outcome.titles(), expected);

        // Candidates 9..=15 are never looked up.
        assert_eq!(source.summary_calls(), expected);
    }

    #[tokio::test]
    async fn skips_failures_without_gaps() {
        let source = StubSource::numbered("Topic", 6).failing(&["Topic 2", "Topic 5"]);
        let outcome = aggregate(&source, "Topic").await;

        assert_eq!(outcome.titles(), vec!["Topic 1", "Topic 3", "Topic 4", "Topic 6"]);
        assert_eq!(outcome.urls().len(), 4);
        assert_eq!(outcome.summaries().len(), 4);
        // Failed candidates are tried once each.
        assert_eq!(source.summary_calls().len(), 6);
    }

    #[tokio::test]
    async fn failures_extend_the_scan_up_to_attempt_cap() {
        let failing: Vec<String> = (1..=10).map(|i| format!("Topic {i}")).collect();
        let failing_refs: Vec<&str> = failing.iter().map(String::as_str).collect();
        let source = StubSource::numbered("Topic", 20).failing(&failing_refs);

        let outcome = aggregate(&source, "Topic").await;

        // Only 15 candidates are requested; 11..=15 succeed.
        assert_eq!(
            outcome.titles(),
            vec!["Topic 11", "Topic 12", "Topic 13", "Topic 14", "Topic 15"]
        );
        assert_eq!(source.summary_calls().len(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn rich_context_uses_first_successful_page() {
        let source = StubSource::numbered("Topic", 3)
            .failing(&["Topic 1"])
            .full_content(Some("Long article about topic two."));
        let outcome = aggregate(&source, "Topic").await;

        assert_eq!(outcome.rich_context, "Long article about topic two.");
        assert_eq!(
            *source.full_content_calls.lock().unwrap(),
            vec!["Topic 2".to_string()]
        );
    }

    #[tokio::test]
    async fn rich_context_falls_back_to_joined_summaries() {
        let source = StubSource::numbered("Topic", 2).full_content(None);
        let outcome = aggregate(&source, "Topic").await;

        assert_eq!(
            outcome.rich_context,
            "Topic 1 is a page. It has two sentences. Topic 2 is a page. It has two sentences."
        );
    }

    #[tokio::test]
    async fn all_failures_yield_empty_outcome() {
        let source = StubSource::numbered("Topic", 3).failing(&["Topic 1", "Topic 2", "Topic 3"]);
        let outcome = aggregate(&source, "Topic").await;

        assert!(outcome.is_empty());
        assert!(outcome.rich_context.is_empty());
        assert!(source.full_content_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_failure_yields_empty_outcome() {
        let source = StubSource::numbered("Topic", 3).search_fails();
        let outcome = aggregate(&source, "Topic").await;

        assert_eq!(outcome, AggregationOutcome::empty());
        assert!(source.summary_calls().is_empty());
    }
}
