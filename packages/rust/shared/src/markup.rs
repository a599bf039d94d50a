//! HTML helpers shared by the annotator and the HTML renderer.

use crate::types::TextSegment;

const DEFAULT_ENTITY_COLOR: &str = "#e0e0e0";

/// Highlight colour for an entity label.
pub fn entity_color(label: &str) -> &'static str {
    match label {
        "PERSON" => "#ffadad",
        "GPE" | "LOC" => "#a0c4ff",
        "ORG" => "#fdffb6",
        "DATE" | "MONEY" => "#caffbf",
        "PRODUCT" => "#ffd6a5",
        "EVENT" => "#ffc6ff",
        _ => DEFAULT_ENTITY_COLOR,
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<mark>` wrapper for one entity; text and label are escaped.
pub fn entity_html(text: &str, label: &str) -> String {
    format!(
        "<mark class=\"entity\" style=\"background-color:{}; padding: 2px 4px; border-radius: 4px; line-height: 1.8;\">{} <span class=\"entity-label\">{}</span></mark>",
        entity_color(label),
        escape_html(text),
        escape_html(label),
    )
}

/// HTML for annotated text: gaps escaped, entities wrapped.
pub fn segments_html(segments: &[TextSegment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            TextSegment::Text { text } => escape_html(text),
            TextSegment::Entity { text, label } => entity_html(text, label),
        })
        .collect()
}
