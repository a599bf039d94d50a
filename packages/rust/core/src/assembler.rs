//! Document assembler.
//!
//! Takes the synthesis result, the annotated source list and the reference
//! list, and lays them out as a render-agnostic [`DocumentTree`]. Structuring
//! only: no entry is dropped, reordered or rewritten.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use topicbrief_shared::{
    Block, DocumentTree, Inline, ReferenceEntry, Section, SectionKind, SourceEntry,
    SynthesisResult, TextStyle,
};

/// Prefix of the report title; the keyword follows.
pub const TITLE_PREFIX: &str = "AI Research Summary";

pub const FOOTER_TEXT: &str =
    "Generated by topicbrief. AI answer synthesized from encyclopedia sources.";

const SECTION_GAP: u16 = 20;
const POINT_GAP: u16 = 6;
const SOURCE_GAP: u16 = 12;
const REFERENCE_GAP: u16 = 10;
const FOOTER_GAP: u16 = 30;

/// Assemble the report, stamped with the current time.
pub fn assemble(
    keyword: &str,
    synthesis: &SynthesisResult,
    sources: &[SourceEntry],
    references: &[ReferenceEntry],
) -> DocumentTree {
    assemble_at(keyword, synthesis, sources, references, Utc::now())
}

/// Assemble the report with an explicit generation time.
///
/// Sections, in order: title, answer, summary, sources, references, footer.
#[instrument(skip_all, fields(keyword = %keyword, sources = sources.len(), references = references.len()))]
pub fn assemble_at(
    keyword: &str,
    synthesis: &SynthesisResult,
    sources: &[SourceEntry],
    references: &[ReferenceEntry],
    generated_at: DateTime<Utc>,
) -> DocumentTree {
    let title = format!("{TITLE_PREFIX}: {keyword}");

    let sections = vec![
        title_section(&title, generated_at),
        answer_section(&synthesis.answer),
        summary_section(&synthesis.summary_points),
        sources_section(keyword, sources),
        references_section(references),
        footer_section(),
    ];

    debug!(
        blocks = sections.iter().map(|s| s.blocks.len()).sum::<usize>(),
        "document assembled"
    );

    DocumentTree {
        title,
        keyword: keyword.to_string(),
        generated_at,
        sections,
    }
}

fn title_section(title: &str, generated_at: DateTime<Utc>) -> Section {
    let mut section = Section::new(SectionKind::Title);
    section.push(Block::heading(1, title));
    section.push(Block::spacer(SECTION_GAP));
    section.push(Block::text(format!(
        "Generated on: {}",
        generated_at.format("%B %d, %Y")
    )));
    section.push(Block::spacer(SECTION_GAP));
    section
}

fn answer_section(answer: &str) -> Section {
    let mut section = Section::new(SectionKind::Answer);
    section.push(Block::heading(2, "AI Answer"));
    section.push(Block::text(answer));
    section.push(Block::spacer(SECTION_GAP));
    section
}

fn summary_section(points: &[String]) -> Section {
    let mut section = Section::new(SectionKind::Summary);
    section.push(Block::heading(2, "AI-Powered Key Points Summary"));
    for (i, point) in points.iter().enumerate() {
        section.push(Block::text(format!("{}. {point}", i + 1)));
        section.push(Block::spacer(POINT_GAP));
    }
    section.push(Block::spacer(SECTION_GAP));
    section
}

fn sources_section(keyword: &str, sources: &[SourceEntry]) -> Section {
    let mut section = Section::new(SectionKind::Sources);
    section.push(Block::heading(2, "Sources"));

    if sources.is_empty() {
        section.push(Block::text(format!("No sources were found for {keyword}.")));
        section.push(Block::spacer(SOURCE_GAP));
        return section;
    }

    for (i, source) in sources.iter().enumerate() {
        section.push(Block::heading(3, format!("{}. {}", i + 1, source.title)));
        section.push(Block::annotated(source.annotated_summary.clone()));
        section.push(Block::link(format!("Read more: {}", source.url), source.url.as_str()));
        section.push(Block::spacer(SOURCE_GAP));
    }
    section
}

fn references_section(references: &[ReferenceEntry]) -> Section {
    let mut section = Section::new(SectionKind::References);
    section.push(Block::heading(2, "Additional References"));
    for reference in references {
        section.push(Block::strong(format!(
            "{} ({})",
            reference.title, reference.category
        )));
        section.push(Block::text(format!("Source: {}", reference.source)));
        section.push(Block::link(reference.url.as_str(), reference.url.as_str()));
        section.push(Block::spacer(REFERENCE_GAP));
    }
    section
}

fn footer_section() -> Section {
    let mut section = Section::new(SectionKind::Footer);
    section.push(Block::spacer(FOOTER_GAP));
    section.push(Block::Paragraph {
        content: Inline::Plain(FOOTER_TEXT.to_string()),
        style: TextStyle::Footer,
    });
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use topicbrief_shared::{SynthesisOrigin, TextSegment};

    fn synthesis() -> SynthesisResult {
        SynthesisResult {
            answer: "Gravity attracts mass.".into(),
            summary_points: (1..=5).map(|i| format!("Point {i}")).collect(),
            origin: SynthesisOrigin::Model,
        }
    }

    fn source(i: usize) -> SourceEntry {
        SourceEntry {
            title: format!("Page {i}"),
            url: format!("https://en.wikipedia.org/wiki/Page_{i}"),
            annotated_summary: vec![
                TextSegment::text("Summary "),
                TextSegment::entity(i.to_string(), "CARDINAL"),
            ],
        }
    }

    fn reference(i: usize) -> ReferenceEntry {
        ReferenceEntry {
            title: format!("Ref {i}"),
            url: format!("https://example.org/{i}"),
            source: "Example".into(),
            category: "Misc".into(),
        }
    }

    fn headings(section: &Section, level: u8) -> Vec<String> {
        section
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level: l, text } if *l == level => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sections_in_fixed_order() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let tree = assemble_at("Gravity", &synthesis(), &[source(1)], &[reference(1)], at);

        let kinds: Vec<SectionKind> = tree.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                SectionKind::Title,
                SectionKind::Answer,
                SectionKind::Summary,
                SectionKind::Sources,
                SectionKind::References,
                SectionKind::Footer,
            ]
        );
        assert_eq!(tree.title, "AI Research Summary: Gravity");
        assert_eq!(tree.generated_at, at);
    }

    #[test]
    fn title_block_carries_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let tree = assemble_at("Gravity", &synthesis(), &[], &[], at);
        let title = tree.section(SectionKind::Title).unwrap();

        assert_eq!(title.blocks[0], Block::heading(1, "AI Research Summary: Gravity"));
        assert!(title.blocks.contains(&Block::text("Generated on: March 07, 2024")));
    }

    #[test]
    fn summary_points_are_numbered_in_order() {
        let tree = assemble("Gravity", &synthesis(), &[], &[]);
        let summary = tree.section(SectionKind::Summary).unwrap();
        let numbered: Vec<String> = summary
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph { content, .. } => Some(content.plain_text().into_owned()),
                _ => None,
            })
            .collect();

        assert_eq!(
            numbered,
            ["1. Point 1", "2. Point 2", "3. Point 3", "4. Point 4", "5. Point 5"]
        );
    }

    #[test]
    fn every_source_and_reference_is_kept_in_order() {
        let sources: Vec<SourceEntry> = (1..=8).map(source).collect();
        let references: Vec<ReferenceEntry> = (1..=6).map(reference).collect();
        let tree = assemble("Gravity", &synthesis(), &sources, &references);

        let section = tree.section(SectionKind::Sources).unwrap();
        let expected: Vec<String> = (1..=8).map(|i| format!("{i}. Page {i}")).collect();
        assert_eq!(headings(section, 3), expected);
        assert_eq!(section.link_count(), 8);
        assert!(section.blocks.contains(&Block::annotated(vec![
            TextSegment::text("Summary "),
            TextSegment::entity("3", "CARDINAL"),
        ])));

        let refs = tree.section(SectionKind::References).unwrap();
        assert_eq!(refs.link_count(), 6);
        assert_eq!(refs.blocks[1], Block::strong("Ref 1 (Misc)"));
    }

    #[test]
    fn empty_source_list_renders_notice() {
        let tree = assemble("Gravity", &synthesis(), &[], &[]);
        let section = tree.section(SectionKind::Sources).unwrap();

        assert_eq!(section.link_count(), 0);
        assert!(section.blocks.contains(&Block::text("No sources were found for Gravity.")));
    }

    #[test]
    fn footer_uses_footer_style() {
        let tree = assemble("Gravity", &synthesis(), &[], &[]);
        let footer = tree.section(SectionKind::Footer).unwrap();
        assert!(matches!(
            footer.blocks.last(),
            Some(Block::Paragraph { style: TextStyle::Footer, .. })
        ));
    }
}
