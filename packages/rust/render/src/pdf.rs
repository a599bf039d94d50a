//! PDF backend.
//!
//! Uses the builtin Helvetica faces from `printpdf`. Layout is a single
//! top-down flow over A4 pages: each block becomes one or more word-wrapped
//! lines, and a new page starts when a line would cross the bottom margin.

use printpdf::{
    BuiltinFont, FontId, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
    TextMatrix, TextRenderingMode,
};
use tracing::{debug, instrument};

use topicbrief_shared::{
    Block, DocumentTree, Inline, ReportFormat, Result, TextSegment, TextStyle, TopicBriefError,
};

use crate::{RenderedReport, Renderer};

const CONTENT_TYPE: &str = "application/pdf";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Average Helvetica advance width, as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const LINE_SPACING: f32 = 1.4;

const BODY_SIZE: f32 = 11.0;
const FOOTER_SIZE: f32 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
    Oblique,
}

/// One positioned line of text. Coordinates are millimetres from the
/// bottom-left corner of the page, `y` being the baseline.
#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    size: f32,
    face: Face,
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for PdfRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    #[instrument(skip_all, fields(keyword = %document.keyword))]
    fn render(&self, document: &DocumentTree) -> Result<RenderedReport> {
        let mut pdf = PdfDocument::new(&document.title);
        let fonts = Fonts::load(&mut pdf)?;

        let pages = layout(document);
        let page_count = pages.len();
        for lines in pages {
            let mut ops = Vec::with_capacity(lines.len() * 6);
            for line in lines {
                let font = fonts.get(line.face);
                ops.extend([
                    Op::SetFontSize {
                        size: Pt(line.size),
                        font: font.clone(),
                    },
                    Op::StartTextSection,
                    Op::SetTextMatrix {
                        matrix: TextMatrix::Translate(Mm(line.x).into(), Mm(line.y).into()),
                    },
                    Op::SetTextRenderingMode {
                        mode: TextRenderingMode::Fill,
                    },
                    Op::WriteText {
                        items: vec![TextItem::Text(line.text)],
                        font,
                    },
                    Op::EndTextSection,
                ]);
            }
            pdf.pages
                .push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops));
        }

        let mut warnings = Vec::new();
        let bytes = pdf.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "pdf save warnings");
        }
        debug!(bytes = bytes.len(), pages = page_count, "pdf rendered");

        Ok(RenderedReport::new(
            document,
            ReportFormat::Pdf,
            CONTENT_TYPE,
            bytes,
        ))
    }
}

struct Fonts {
    regular: FontId,
    bold: FontId,
    oblique: FontId,
}

impl Fonts {
    fn load(pdf: &mut PdfDocument) -> Result<Self> {
        Ok(Self {
            regular: load_font(pdf, BuiltinFont::Helvetica, "Helvetica")?,
            bold: load_font(pdf, BuiltinFont::HelveticaBold, "Helvetica-Bold")?,
            oblique: load_font(pdf, BuiltinFont::HelveticaOblique, "Helvetica-Oblique")?,
        })
    }

    fn get(&self, face: Face) -> FontId {
        match face {
            Face::Regular => self.regular.clone(),
            Face::Bold => self.bold.clone(),
            Face::Oblique => self.oblique.clone(),
        }
    }
}

fn load_font(pdf: &mut PdfDocument, builtin: BuiltinFont, name: &str) -> Result<FontId> {
    let bytes = builtin.get_subset_font().bytes;
    let font = ParsedFont::from_bytes(&bytes, 0, &mut Vec::new())
        .ok_or_else(|| TopicBriefError::Render(format!("failed to parse builtin font {name}")))?;
    Ok(pdf.add_font(&font))
}

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 20.0,
        2 => 15.0,
        3 => 12.5,
        _ => BODY_SIZE,
    }
}

/// Flatten annotated text; entities keep their label in parentheses.
fn inline_text(content: &Inline) -> String {
    match content {
        Inline::Plain(text) | Inline::Strong(text) => text.clone(),
        Inline::Annotated(segments) => segments
            .iter()
            .map(|segment| match segment {
                TextSegment::Text { text } => text.clone(),
                TextSegment::Entity { text, label } => format!("{text} ({label})"),
            })
            .collect(),
    }
}

/// Characters that fit on one line at `size` points.
fn line_capacity(size: f32) -> usize {
    let usable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) * PT_PER_MM;
    ((usable_pt / (size * AVG_GLYPH_EM)) as usize).max(1)
}

/// Greedy word wrap; words longer than a line are split.
fn wrap(text: &str, capacity: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > capacity {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(capacity);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len > 0 && current_len + needed > capacity {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Page-by-page line placement. Always yields at least one page.
struct Flow {
    pages: Vec<Vec<Line>>,
    y: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn space(&mut self, points: f32) {
        self.y -= points / PT_PER_MM;
        if self.y < MARGIN_MM {
            self.new_page();
        }
    }

    fn paragraph(&mut self, text: &str, size: f32, face: Face, centered: bool) {
        let line_height = size * LINE_SPACING / PT_PER_MM;
        for text in wrap(text, line_capacity(size)) {
            if self.y - line_height < MARGIN_MM {
                self.new_page();
            }
            self.y -= line_height;

            let x = if centered {
                let width = text.chars().count() as f32 * size * AVG_GLYPH_EM / PT_PER_MM;
                ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM)
            } else {
                MARGIN_MM
            };
            if let Some(page) = self.pages.last_mut() {
                page.push(Line {
                    text,
                    size,
                    face,
                    x,
                    y: self.y,
                });
            }
        }
        self.y -= size * 0.5 / PT_PER_MM;
    }
}

fn layout(document: &DocumentTree) -> Vec<Vec<Line>> {
    let mut flow = Flow::new();

    for section in &document.sections {
        for block in &section.blocks {
            match block {
                Block::Heading { level, text } => {
                    flow.paragraph(text, heading_size(*level), Face::Bold, *level == 1)
                }
                Block::Paragraph { content, style } => {
                    let text = inline_text(content);
                    match (style, content) {
                        (TextStyle::Footer, _) => {
                            flow.paragraph(&text, FOOTER_SIZE, Face::Oblique, true)
                        }
                        (TextStyle::Body, Inline::Strong(_)) => {
                            flow.paragraph(&text, BODY_SIZE, Face::Bold, false)
                        }
                        (TextStyle::Body, _) => {
                            flow.paragraph(&text, BODY_SIZE, Face::Regular, false)
                        }
                    }
                }
                Block::Link { label, .. } => flow.paragraph(label, BODY_SIZE, Face::Regular, false),
                Block::Spacer { points } => flow.space(f32::from(*points)),
            }
        }
    }

    flow.pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use topicbrief_shared::{Section, SectionKind};

    fn all_lines(pages: &[Vec<Line>]) -> Vec<&Line> {
        pages.iter().flatten().collect()
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap("aa bb cc dd", 5), ["aa bb", "cc dd"]);
        assert_eq!(wrap("abcdefgh ij", 3), ["abc", "def", "gh", "ij"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn lines_stay_inside_the_margins() {
        let pages = layout(&fixtures::document());
        for line in all_lines(&pages) {
            assert!(line.y >= MARGIN_MM, "{line:?}");
            assert!(line.x >= MARGIN_MM, "{line:?}");
            assert!(line.text.chars().count() <= line_capacity(line.size));
        }
    }

    #[test]
    fn text_and_entities_are_kept() {
        let pages = layout(&fixtures::document());
        let text: Vec<&str> = pages.iter().flatten().map(|l| l.text.as_str()).collect();
        let joined = text.join(" ");

        assert_eq!(text[0], "AI Research Summary: Black Hole");
        assert!(joined.contains("Karl Schwarzschild (PERSON) found the solution."));
        assert!(joined.contains("See <script>alert(1)</script>."));
    }

    #[test]
    fn long_documents_paginate() {
        let mut doc = fixtures::document();
        let mut section = Section::new(SectionKind::Sources);
        for i in 0..120 {
            section.push(Block::text(format!("Paragraph {i} about black holes.")));
        }
        doc.sections.insert(3, section);

        let pages = layout(&doc);
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| !p.is_empty()));
        // Order is preserved across page breaks.
        let texts: Vec<&str> = pages.iter().flatten().map(|l| l.text.as_str()).collect();
        let first = texts.iter().position(|t| *t == "Paragraph 0 about black holes.");
        let last = texts.iter().position(|t| *t == "Paragraph 119 about black holes.");
        assert!(first < last);
    }

    #[test]
    fn styles_map_to_faces() {
        let pages = layout(&fixtures::document());
        let lines = all_lines(&pages);
        let face_of = |needle: &str| lines.iter().find(|l| l.text.starts_with(needle)).map(|l| l.face);

        assert_eq!(face_of("AI Answer"), Some(Face::Bold));
        assert_eq!(face_of("Academic Research"), Some(Face::Bold));
        assert_eq!(face_of("Light can't"), Some(Face::Regular));
        assert_eq!(face_of("Generated by"), Some(Face::Oblique));
    }

    #[test]
    fn renders_a_pdf_file() {
        let report = PdfRenderer::new().render(&fixtures::document()).unwrap();
        assert_eq!(report.content_type, CONTENT_TYPE);
        assert_eq!(report.filename, "Black_Hole_ai_research_summary.pdf");
        assert!(report.bytes.starts_with(b"%PDF"));
    }
}
