//! Render-agnostic document tree handed to a renderer.
//!
//! The tree is an ordered list of sections, each an ordered list of blocks.
//! It is built once per request and never mutated after assembly.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TextSegment, plain_text};

/// The assembled report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Report title (also used as the rendered page title).
    pub title: String,
    /// Keyword the report was generated for.
    pub keyword: String,
    /// Generation timestamp shown in the title block.
    pub generated_at: DateTime<Utc>,
    /// Sections in display order.
    pub sections: Vec<Section>,
}

impl DocumentTree {
    /// Find the first section of the given kind.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Section identity, used by renderers for anchors and by tests for lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Title,
    Answer,
    Summary,
    Sources,
    References,
    Footer,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Answer => "answer",
            Self::Summary => "summary",
            Self::Sources => "sources",
            Self::References => "references",
            Self::Footer => "footer",
        }
    }
}

/// An ordered group of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Number of link blocks in the section.
    pub fn link_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Link { .. }))
            .count()
    }
}

/// A single block element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { content: Inline, style: TextStyle },
    Link { label: String, href: String },
    /// Vertical space, in points.
    Spacer { points: u16 },
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Paragraph {
            content: Inline::Plain(text.into()),
            style: TextStyle::Body,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self::Paragraph {
            content: Inline::Strong(text.into()),
            style: TextStyle::Body,
        }
    }

    pub fn annotated(segments: Vec<TextSegment>) -> Self {
        Self::Paragraph {
            content: Inline::Annotated(segments),
            style: TextStyle::Body,
        }
    }

    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::Link {
            label: label.into(),
            href: href.into(),
        }
    }

    pub fn spacer(points: u16) -> Self {
        Self::Spacer { points }
    }
}

/// Paragraph content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text; renderers escape it.
    Plain(String),
    /// Emphasised plain text.
    Strong(String),
    /// Text with recognised entities; renderers escape every segment.
    Annotated(Vec<TextSegment>),
}

impl Inline {
    /// The paragraph text with all styling and labels dropped.
    pub fn plain_text(&self) -> Cow<'_, str> {
        match self {
            Self::Plain(s) | Self::Strong(s) => Cow::Borrowed(s),
            Self::Annotated(segments) => Cow::Owned(plain_text(segments)),
        }
    }
}

/// Paragraph style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Body,
    /// Small, centred text.
    Footer,
}
