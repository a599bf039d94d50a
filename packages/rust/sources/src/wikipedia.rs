//! MediaWiki action API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use topicbrief_shared::{PageResult, Result, SourceConfig, TopicBriefError};

use crate::KnowledgeSource;

/// User-Agent string for API requests (Wikimedia asks clients to identify themselves).
const USER_AGENT: &str = concat!("topicbrief/", env!("CARGO_PKG_VERSION"));

/// Sentences requested for a page summary.
const SUMMARY_SENTENCES: u32 = 2;

/// Default timeout in seconds for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Connection settings for [`WikipediaSource`].
#[derive(Debug, Clone)]
pub struct WikipediaOptions {
    /// `api.php` endpoint.
    pub api_url: String,
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for WikipediaOptions {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl From<&SourceConfig> for WikipediaOptions {
    fn from(config: &SourceConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Response shapes (formatversion=2)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    search: Vec<SearchHit>,
    #[serde(default)]
    pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    redirect: bool,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<serde_json::Value>,
}

impl ApiPage {
    fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|p| p.disambiguation.is_some())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`KnowledgeSource`] backed by a MediaWiki installation (Wikipedia by default).
#[derive(Debug, Clone)]
pub struct WikipediaSource {
    client: Client,
    api_url: String,
}

impl WikipediaSource {
    /// Build a source with its own HTTP client.
    pub fn new(opts: &WikipediaOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| TopicBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: opts.api_url.clone(),
        })
    }

    /// Issue a `GET api.php?action=query&format=json&formatversion=2&...` request.
    async fn query(&self, params: &[(&str, &str)]) -> Result<QueryBody> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| TopicBriefError::Network(format!("{}: {e}", self.api_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicBriefError::Network(format!(
                "{}: HTTP {status}",
                self.api_url
            )));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| TopicBriefError::parse(format!("invalid API response: {e}")))?;

        if let Some(err) = body.error {
            return Err(TopicBriefError::Network(format!(
                "API error {}: {}",
                err.code, err.info
            )));
        }

        Ok(body.query.unwrap_or_default())
    }

    /// Pull the single page out of a `titles=` query.
    fn single_page(body: QueryBody, title: &str) -> Result<ApiPage> {
        let page = body
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| TopicBriefError::NotFound {
                title: title.to_string(),
            })?;

        if page.missing || page.invalid {
            return Err(TopicBriefError::NotFound {
                title: title.to_string(),
            });
        }

        Ok(page)
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaSource {
    #[instrument(skip(self), fields(api = %self.api_url))]
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<String>> {
        let limit = limit.to_string();
        let body = self
            .query(&[
                ("list", "search"),
                ("srsearch", keyword),
                ("srlimit", limit.as_str()),
                ("srprop", ""),
            ])
            .await?;

        let titles: Vec<String> = body.search.into_iter().map(|hit| hit.title).collect();
        debug!(count = titles.len(), "search returned candidates");
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn fetch_summary(&self, title: &str) -> Result<PageResult> {
        let sentences = SUMMARY_SENTENCES.to_string();
        let body = self
            .query(&[
                ("prop", "extracts|info|pageprops"),
                ("titles", title),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
            ])
            .await?;

        let page = Self::single_page(body, title)?;

        if page.redirect {
            return Err(TopicBriefError::Redirect {
                title: title.to_string(),
            });
        }
        if page.is_disambiguation() {
            return Err(TopicBriefError::Disambiguation {
                title: title.to_string(),
            });
        }

        let url = page
            .fullurl
            .ok_or_else(|| TopicBriefError::parse(format!("no URL returned for '{title}'")))?;

        Ok(PageResult {
            title: title.to_string(),
            url,
            summary: page.extract.unwrap_or_default().trim().to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn fetch_full_content(&self, title: &str) -> Result<String> {
        let body = self
            .query(&[
                ("prop", "extracts"),
                ("titles", title),
                ("explaintext", "1"),
                ("redirects", "1"),
            ])
            .await?;

        let page = Self::single_page(body, title)?;
        let content = page.extract.unwrap_or_default();

        if content.trim().is_empty() {
            return Err(TopicBriefError::NotFound {
                title: page.title,
            });
        }

        debug!(chars = content.chars().count(), "fetched full content");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_for(server: &MockServer) -> WikipediaSource {
        let opts = WikipediaOptions {
            api_url: format!("{}/w/api.php", server.uri()),
            timeout_secs: 5,
        };
        WikipediaSource::new(&opts).unwrap()
    }

    #[tokio::test]
    async fn search_returns_titles_in_rank_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "Gravity"))
            .and(query_param("srlimit", "15"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "batchcomplete": true,
                "query": {
                    "searchinfo": { "totalhits": 3 },
                    "search": [
                        { "ns": 0, "title": "Gravity", "pageid": 1 },
                        { "ns": 0, "title": "Gravity (2013 film)", "pageid": 2 },
                        { "ns": 0, "title": "Gravitational wave", "pageid": 3 }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let titles = source.search("Gravity", 15).await.unwrap();
        assert_eq!(
            titles,
            vec!["Gravity", "Gravity (2013 film)", "Gravitational wave"]
        );
    }

    #[tokio::test]
    async fn search_surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "code": "nosrsearch", "info": "The \"srsearch\" parameter must be set." }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.search("", 15).await.unwrap_err();
        assert!(err.to_string().contains("nosrsearch"));
    }

    #[tokio::test]
    async fn fetch_summary_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("titles", "Gravity"))
            .and(query_param("exsentences", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {
                    "pages": [{
                        "pageid": 1, "ns": 0, "title": "Gravity",
                        "fullurl": "https://en.wikipedia.org/wiki/Gravity",
                        "extract": "In physics, gravity is a fundamental interaction. It attracts masses.\n"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let page = source.fetch_summary("Gravity").await.unwrap();
        assert_eq!(page.title, "Gravity");
        assert_eq!(page.url, "https://en.wikipedia.org/wiki/Gravity");
        assert_eq!(
            page.summary,
            "In physics, gravity is a fundamental interaction. It attracts masses."
        );
    }

    #[tokio::test]
    async fn fetch_summary_missing_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [{ "ns": 0, "title": "Gravityy", "missing": true }] }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch_summary("Gravityy").await.unwrap_err();
        assert!(matches!(err, TopicBriefError::NotFound { .. }));
    }

    #[tokio::test]
    async fn fetch_summary_disambiguation() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [{
                    "pageid": 7, "ns": 0, "title": "Mercury",
                    "fullurl": "https://en.wikipedia.org/wiki/Mercury",
                    "extract": "Mercury may refer to:",
                    "pageprops": { "disambiguation": "" }
                }] }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch_summary("Mercury").await.unwrap_err();
        assert!(matches!(err, TopicBriefError::Disambiguation { .. }));
    }

    #[tokio::test]
    async fn fetch_summary_refuses_redirects() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [{
                    "pageid": 9, "ns": 0, "title": "Gravitation", "redirect": true,
                    "fullurl": "https://en.wikipedia.org/wiki/Gravitation"
                }] }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch_summary("Gravitation").await.unwrap_err();
        assert!(matches!(err, TopicBriefError::Redirect { .. }));
    }

    #[tokio::test]
    async fn fetch_summary_http_error_is_network() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch_summary("Gravity").await.unwrap_err();
        assert!(matches!(err, TopicBriefError::Network(_)));
        assert!(!err.is_lookup_miss());
    }

    #[tokio::test]
    async fn fetch_full_content_follows_redirects() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("redirects", "1"))
            .and(query_param("titles", "Gravity"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [{
                    "pageid": 1, "ns": 0, "title": "Gravity",
                    "extract": "In physics, gravity is a fundamental interaction.\n\n== History ==\nLong text."
                }] }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let content = source.fetch_full_content("Gravity").await.unwrap();
        assert!(content.contains("== History =="));
    }

    #[tokio::test]
    async fn fetch_full_content_empty_extract_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [{ "pageid": 1, "ns": 0, "title": "Gravity", "extract": "" }] }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch_full_content("Gravity").await.unwrap_err();
        assert!(matches!(err, TopicBriefError::NotFound { .. }));
    }
}
