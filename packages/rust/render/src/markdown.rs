//! Markdown backend.
//!
//! All document text is backslash-escaped, so titles, summaries and labels
//! render literally and no raw HTML reaches the output. Entities become
//! `**text** _(LABEL)_`.

use tracing::{debug, instrument};

use topicbrief_shared::{
    Block, DocumentTree, Inline, ReportFormat, Result, TextSegment, TextStyle,
};

use crate::{RenderedReport, Renderer};

const CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for MarkdownRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }

    #[instrument(skip_all, fields(keyword = %document.keyword))]
    fn render(&self, document: &DocumentTree) -> Result<RenderedReport> {
        let mut out = String::new();
        for section in &document.sections {
            for block in &section.blocks {
                let rendered = match block {
                    Block::Heading { level, text } => format!(
                        "{} {}",
                        "#".repeat(usize::from((*level).clamp(1, 6))),
                        escape(text)
                    ),
                    Block::Paragraph { content, style } => {
                        let body = inline(content);
                        match style {
                            TextStyle::Body => body,
                            TextStyle::Footer => format!("---\n\n_{body}_"),
                        }
                    }
                    Block::Link { label, href } => format!("[{}]({href})", escape(label)),
                    // Paragraph breaks already separate blocks.
                    Block::Spacer { .. } => continue,
                };
                out.push_str(&rendered);
                out.push_str("\n\n");
            }
        }

        let body = format!("{}\n", out.trim_end());
        debug!(bytes = body.len(), "markdown rendered");

        Ok(RenderedReport::new(
            document,
            ReportFormat::Markdown,
            CONTENT_TYPE,
            body.into_bytes(),
        ))
    }
}

fn inline(content: &Inline) -> String {
    match content {
        Inline::Plain(text) => escape(text),
        Inline::Strong(text) => format!("**{}**", escape(text)),
        Inline::Annotated(segments) => segments
            .iter()
            .map(|segment| match segment {
                TextSegment::Text { text } => escape(text),
                TextSegment::Entity { text, label } => {
                    format!("**{}** _({})_", escape(text), escape(label))
                }
            })
            .collect(),
    }
}

/// Backslash-escape Markdown syntax characters.
///
/// `#` only matters at the start of a line, so only a leading one is escaped.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => out.push_str("\\#"),
            _ => out.push(c),
        }
    }
    out
}
