//! Standalone HTML backend.

use std::fmt::Write as _;

use tracing::{debug, instrument};

use topicbrief_shared::{
    Block, DocumentTree, Inline, ReportFormat, Result, TextStyle, escape_html as escape,
    segments_html,
};

use crate::{RenderedReport, Renderer};

const CONTENT_TYPE: &str = "text/html; charset=utf-8";

const STYLE: &str = "\
body { font-family: Helvetica, Arial, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { text-align: center; }
a { color: #1a5fb4; word-break: break-all; }
.entity-label { font-size: 0.7em; font-weight: bold; text-transform: uppercase; margin-left: 0.25em; opacity: 0.7; }
.footer { font-size: 0.8em; text-align: center; color: #666; }
";

#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for HtmlRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }

    #[instrument(skip_all, fields(keyword = %document.keyword))]
    fn render(&self, document: &DocumentTree) -> Result<RenderedReport> {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape(&document.title));
        let _ = writeln!(out, "<style>\n{STYLE}</style>\n</head>\n<body>");

        for section in &document.sections {
            let _ = writeln!(
                out,
                "<section class=\"{kind}\" id=\"{kind}\">",
                kind = section.kind.as_str()
            );
            for block in &section.blocks {
                write_block(&mut out, block);
            }
            out.push_str("</section>\n");
        }

        out.push_str("</body>\n</html>\n");
        debug!(bytes = out.len(), "html rendered");

        Ok(RenderedReport::new(
            document,
            ReportFormat::Html,
            CONTENT_TYPE,
            out.into_bytes(),
        ))
    }
}

fn write_block(out: &mut String, block: &Block) {
    let _ = match block {
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            writeln!(out, "<h{level}>{}</h{level}>", escape(text))
        }
        Block::Paragraph { content, style } => {
            let class = match style {
                TextStyle::Body => "",
                TextStyle::Footer => " class=\"footer\"",
            };
            let body = match content {
                Inline::Plain(text) => escape(text),
                Inline::Strong(text) => format!("<strong>{}</strong>", escape(text)),
                Inline::Annotated(segments) => segments_html(segments),
            };
            writeln!(out, "<p{class}>{body}</p>")
        }
        Block::Link { label, href } => {
            writeln!(out, "<p><a href=\"{}\">{}</a></p>", escape(href), escape(label))
        }
        Block::Spacer { points } => {
            writeln!(out, "<div class=\"spacer\" style=\"height: {points}pt\"></div>")
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use scraper::{Html, Selector};

    fn render() -> Html {
        let report = HtmlRenderer::new().render(&fixtures::document()).unwrap();
        Html::parse_document(&String::from_utf8(report.bytes).unwrap())
    }

    fn select<'a>(doc: &'a Html, css: &str) -> Vec<scraper::ElementRef<'a>> {
        let selector = Selector::parse(css).unwrap();
        doc.select(&selector).collect()
    }

    #[test]
    fn page_has_title_and_sections() {
        let doc = render();
        let title = select(&doc, "title");
        assert_eq!(title[0].text().collect::<String>(), "AI Research Summary: Black Hole");

        let ids: Vec<&str> = select(&doc, "section")
            .iter()
            .filter_map(|s| s.value().attr("id"))
            .collect();
        assert_eq!(ids, ["title", "answer", "sources", "references", "footer"]);
    }

    #[test]
    fn plain_text_is_escaped() {
        let doc = render();
        let answer = select(&doc, "section#answer p");
        assert_eq!(
            answer[0].text().collect::<String>(),
            "Light can't escape <really> & never will."
        );
        assert!(select(&doc, "really").is_empty());
    }

    #[test]
    fn summary_text_is_escaped() {
        let doc = render();
        assert!(select(&doc, "script").is_empty());

        let paragraphs = select(&doc, "section#sources p");
        let texts: Vec<String> = paragraphs.iter().map(|p| p.text().collect()).collect();
        assert!(texts.contains(
            &"For integers a<b and b<c it follows that a<c. See <script>alert(1)</script>."
                .to_string()
        ));
    }

    #[test]
    fn entities_are_highlighted() {
        let doc = render();
        let marks = select(&doc, "mark.entity");
        assert_eq!(marks.len(), 1);

        let label = select(&doc, "mark.entity span.entity-label");
        assert_eq!(label[0].text().collect::<String>(), "PERSON");
    }

    #[test]
    fn links_and_footer() {
        let doc = render();
        let links = select(&doc, "section#sources a");
        assert_eq!(
            links[0].value().attr("href"),
            Some("https://en.wikipedia.org/wiki/Black_hole")
        );
        assert_eq!(select(&doc, "p.footer").len(), 1);
    }
}
