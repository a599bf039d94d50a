//! Core domain types for a single research request.
//!
//! Everything here is created and dropped within one request; nothing is
//! cached or persisted between requests.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// A page that was fetched successfully from the knowledge source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Exact page title, as returned by the search.
    pub title: String,
    /// Canonical page URL.
    pub url: String,
    /// Two-sentence plain-text summary.
    pub summary: String,
}

/// Bounded, ordered result of turning search candidates into page summaries.
///
/// Pages are stored as whole records so titles, URLs and summaries can never
/// drift out of step; the accessor methods expose them as parallel sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOutcome {
    /// Successful pages in candidate order.
    pub pages: Vec<PageResult>,
    /// Full text of the first page, or the joined summaries when that fetch fails.
    pub rich_context: String,
}

impl AggregationOutcome {
    /// The "no results" outcome: empty sequences and empty context.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.title.as_str()).collect()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.url.as_str()).collect()
    }

    pub fn summaries(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.summary.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Number of summary points every synthesis result carries.
pub const SUMMARY_POINT_COUNT: usize = 5;

/// Fixed-shape output of the response synthesizer: one answer, five points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Direct answer (never empty).
    pub answer: String,
    /// Exactly [`SUMMARY_POINT_COUNT`] key points.
    pub summary_points: Vec<String>,
    /// How the result was obtained.
    pub origin: SynthesisOrigin,
}

/// Which path produced a [`SynthesisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisOrigin {
    /// Parsed from a model reply (possibly padded).
    Model,
    /// The model replied with blank text.
    EmptyReply,
    /// The model call failed.
    ModelFailure,
    /// No model is configured.
    ModelUnavailable,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A labeled range over a single text value.
///
/// Offsets are **character** offsets (not bytes); `start` is inclusive and
/// `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            text: text.into(),
        }
    }
}

/// One run of annotated text.
///
/// A summary is split into plain gaps and labelled entities so each renderer
/// escapes the text itself and adds its own highlight markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSegment {
    Text { text: String },
    Entity { text: String, label: String },
}

impl TextSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn entity(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Entity {
            text: text.into(),
            label: label.into(),
        }
    }

    /// The underlying text, without any label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text { text } | Self::Entity { text, .. } => text,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity { .. })
    }
}

/// Concatenate the text of `segments`, dropping labels.
pub fn plain_text(segments: &[TextSegment]) -> String {
    segments.iter().map(TextSegment::as_str).collect()
}

// ---------------------------------------------------------------------------
// Sources and references
// ---------------------------------------------------------------------------

/// A source as it appears in the final document: summary already annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub title: String,
    pub url: String,
    /// Summary split into plain text and recognised entities.
    pub annotated_summary: Vec<TextSegment>,
}

/// A static "further reading" link derived from the keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub title: String,
    pub url: String,
    pub source: String,
    pub category: String,
}

// ---------------------------------------------------------------------------
// Report filename
// ---------------------------------------------------------------------------

/// Suffix appended to every report filename stem.
const REPORT_SUFFIX: &str = "ai_research_summary";

/// Derive a download filename from the keyword.
///
/// Characters that are neither alphanumeric nor whitespace become `_`, and
/// each run of whitespace becomes a single `_`.
pub fn report_filename(keyword: &str, extension: &str) -> String {
    let mut stem = String::with_capacity(keyword.len());
    let mut in_space = false;

    for c in keyword.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        stem.push(if c.is_alphanumeric() { c } else { '_' });
    }

    if stem.is_empty() {
        stem.push_str("search_results");
    }

    format!("{stem}_{REPORT_SUFFIX}.{extension}")
}
