//! Application configuration for topicbrief.
//!
//! User config lives at `~/.topicbrief/topicbrief.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! Only collaborator endpoints and output preferences are configurable. The
//! aggregation caps, context truncation, and sampling parameters are
//! compile-time constants of the core crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopicBriefError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "topicbrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".topicbrief";

// ---------------------------------------------------------------------------
// Config structs (matching topicbrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Encyclopedia search/fetch settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Entity recognizer settings.
    #[serde(default)]
    pub entities: EntitiesConfig,

    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// MediaWiki `api.php` endpoint.
    #[serde(default = "default_source_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_source_api_url(),
            timeout_secs: default_source_timeout(),
        }
    }
}

fn default_source_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn default_source_timeout() -> u64 {
    15
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier sent with every completion request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_model() -> String {
    "llama3-8b-8192".into()
}
fn default_llm_timeout() -> u64 {
    60
}

/// Which entity recognizer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityBackend {
    /// Built-in regex recognizer (dates, money, percentages).
    Pattern,
    /// Remote recognizer service at `entities.endpoint`.
    Http,
    /// No recognition; summaries pass through unchanged.
    Disabled,
}

/// `[entities]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesConfig {
    /// Recognizer backend.
    #[serde(default = "default_entity_backend")]
    pub backend: EntityBackend,

    /// Endpoint for the `http` backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds for the `http` backend.
    #[serde(default = "default_entities_timeout")]
    pub timeout_secs: u64,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            backend: default_entity_backend(),
            endpoint: None,
            timeout_secs: default_entities_timeout(),
        }
    }
}

fn default_entity_backend() -> EntityBackend {
    EntityBackend::Pattern
}
fn default_entities_timeout() -> u64 {
    10
}

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Markdown,
    Html,
    Pdf,
}

impl ReportFormat {
    /// File extension used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = TopicBriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            other => Err(TopicBriefError::validation(format!(
                "unknown report format '{other}': expected 'markdown', 'html' or 'pdf'"
            ))),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Default report format.
    #[serde(default = "default_format")]
    pub format: ReportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: default_format(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_format() -> ReportFormat {
    ReportFormat::Markdown
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.topicbrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TopicBriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.topicbrief/topicbrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TopicBriefError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        TopicBriefError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TopicBriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TopicBriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TopicBriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configurations that cannot produce working collaborators.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    url::Url::parse(&config.source.api_url).map_err(|e| {
        TopicBriefError::config(format!("invalid source.api_url '{}': {e}", config.source.api_url))
    })?;
    url::Url::parse(&config.llm.api_url).map_err(|e| {
        TopicBriefError::config(format!("invalid llm.api_url '{}': {e}", config.llm.api_url))
    })?;

    if config.entities.backend == EntityBackend::Http {
        let endpoint = config.entities.endpoint.as_deref().ok_or_else(|| {
            TopicBriefError::config("entities.backend = \"http\" requires entities.endpoint")
        })?;
        url::Url::parse(endpoint).map_err(|e| {
            TopicBriefError::config(format!("invalid entities.endpoint '{endpoint}': {e}"))
        })?;
    }

    Ok(())
}

/// Read the model API key from the configured env var.
///
/// Returns `None` when the variable is unset or empty; the caller decides
/// whether that degrades the model to "unavailable" or is fatal.
pub fn resolve_api_key(config: &LlmConfig) -> Option<String> {
    match std::env::var(&config.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}
