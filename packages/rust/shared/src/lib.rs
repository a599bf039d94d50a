//! Shared types, error model, and configuration for topicbrief.
//!
//! This crate is the foundation depended on by all other topicbrief crates.
//! It provides:
//! - [`TopicBriefError`] — the unified error type
//! - Domain types ([`AggregationOutcome`], [`SynthesisResult`], [`EntitySpan`], [`ReferenceEntry`])
//! - The render-agnostic [`DocumentTree`] and its HTML escaping helpers
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod document;
pub mod error;
pub mod markup;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EntitiesConfig, EntityBackend, LlmConfig, OutputConfig, ReportFormat,
    SourceConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key, validate_config,
};
pub use document::{Block, DocumentTree, Inline, Section, SectionKind, TextStyle};
pub use error::{Result, TopicBriefError};
pub use markup::{entity_color, entity_html, escape_html, segments_html};
pub use types::{
    AggregationOutcome, EntitySpan, PageResult, ReferenceEntry, SUMMARY_POINT_COUNT,
    SourceEntry, SynthesisOrigin, SynthesisResult, TextSegment, plain_text, report_filename,
};
