//! Document rendering backends.
//!
//! A [`Renderer`] turns an assembled [`DocumentTree`] into a downloadable
//! artifact. Three backends are provided:
//! - [`MarkdownRenderer`] — escaped Markdown, entities in bold with their label
//! - [`HtmlRenderer`] — a standalone HTML page with entity highlight styles
//! - [`PdfRenderer`] — an A4 PDF set in the builtin Helvetica faces

mod html;
mod markdown;
mod pdf;

use sha2::{Digest, Sha256};

use topicbrief_shared::{DocumentTree, ReportFormat, Result, report_filename};

pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;
pub use pdf::PdfRenderer;

/// A rendered report, ready to write or serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// Download filename derived from the keyword.
    pub filename: String,
    /// Hex SHA-256 of `bytes`.
    pub sha256: String,
}

impl RenderedReport {
    fn new(
        document: &DocumentTree,
        format: ReportFormat,
        content_type: &'static str,
        bytes: Vec<u8>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let sha256 = format!("{:x}", hasher.finalize());

        Self {
            filename: report_filename(&document.keyword, format.extension()),
            content_type,
            sha256,
            bytes,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Rendering capability: document tree → byte stream.
pub trait Renderer: Send + Sync {
    fn format(&self) -> ReportFormat;

    fn render(&self, document: &DocumentTree) -> Result<RenderedReport>;
}

/// The renderer for a configured output format.
pub fn renderer_for(format: ReportFormat) -> Box<dyn Renderer> {
    match format {
        ReportFormat::Markdown => Box::new(MarkdownRenderer::new()),
        ReportFormat::Html => Box::new(HtmlRenderer::new()),
        ReportFormat::Pdf => Box::new(PdfRenderer::new()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use topicbrief_shared::{
        Block, DocumentTree, Inline, Section, SectionKind, TextSegment, TextStyle,
    };

    /// A small document exercising every block kind.
    pub(crate) fn document() -> DocumentTree {
        let mut title = Section::new(SectionKind::Title);
        title.push(Block::heading(1, "AI Research Summary: Black Hole"));
        title.push(Block::spacer(20));
        title.push(Block::text("Generated on: March 07, 2024"));

        let mut answer = Section::new(SectionKind::Answer);
        answer.push(Block::heading(2, "AI Answer"));
        answer.push(Block::text("Light can't escape <really> & never will."));

        let mut sources = Section::new(SectionKind::Sources);
        sources.push(Block::heading(2, "Sources"));
        sources.push(Block::heading(3, "1. Black hole"));
        sources.push(Block::annotated(vec![
            TextSegment::entity("Karl Schwarzschild", "PERSON"),
            TextSegment::text(" found the solution."),
        ]));
        sources.push(Block::link(
            "Read more: https://en.wikipedia.org/wiki/Black_hole",
            "https://en.wikipedia.org/wiki/Black_hole",
        ));
        sources.push(Block::heading(3, "2. Order theory"));
        sources.push(Block::annotated(vec![TextSegment::text(
            "For integers a<b and b<c it follows that a<c. See <script>alert(1)</script>.",
        )]));

        let mut references = Section::new(SectionKind::References);
        references.push(Block::heading(2, "Additional References"));
        references.push(Block::strong("Academic Research on Black Hole (Academic)"));

        let mut footer = Section::new(SectionKind::Footer);
        footer.push(Block::spacer(30));
        footer.push(Block::Paragraph {
            content: Inline::Plain("Generated by topicbrief.".into()),
            style: TextStyle::Footer,
        });

        DocumentTree {
            title: "AI Research Summary: Black Hole".into(),
            keyword: "Black Hole".into(),
            generated_at: Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap(),
            sections: vec![title, answer, sources, references, footer],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_matches_format() {
        assert_eq!(renderer_for(ReportFormat::Markdown).format(), ReportFormat::Markdown);
        assert_eq!(renderer_for(ReportFormat::Html).format(), ReportFormat::Html);
        assert_eq!(renderer_for(ReportFormat::Pdf).format(), ReportFormat::Pdf);
    }

    #[test]
    fn report_metadata() {
        let doc = fixtures::document();
        let report = renderer_for(ReportFormat::Html).render(&doc).unwrap();

        assert_eq!(report.filename, "Black_Hole_ai_research_summary.html");
        assert_eq!(report.content_type, "text/html; charset=utf-8");
        assert_eq!(report.sha256.len(), 64);
        assert_eq!(report.size_bytes(), report.bytes.len());
    }

    #[test]
    fn checksum_is_stable() {
        let doc = fixtures::document();
        let a = MarkdownRenderer::new().render(&doc).unwrap();
        let b = MarkdownRenderer::new().render(&doc).unwrap();
        assert_eq!(a.sha256, b.sha256);

        let mut hasher = Sha256::new();
        hasher.update(&a.bytes);
        assert_eq!(a.sha256, format!("{:x}", hasher.finalize()));
    }
}
