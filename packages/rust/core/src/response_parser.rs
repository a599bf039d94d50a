//! Line scanner for model replies.
//!
//! The reply is expected to contain an `ANSWER:` section followed by a
//! `SUMMARY POINTS:` section of enumerated lines. The scanner moves through
//! [`ParserState`] monotonically and never fails; shape guarantees (five
//! points, non-empty answer) are applied afterwards by [`finalize`].

use std::sync::LazyLock;

use regex::Regex;

use topicbrief_shared::SUMMARY_POINT_COUNT;

pub const ANSWER_MARKER: &str = "ANSWER:";
pub const SUMMARY_MARKER: &str = "SUMMARY POINTS:";

/// Cleaned points with fewer characters than this are treated as noise.
///
/// Heuristic; short but legitimate points are lost below this threshold.
pub const MIN_POINT_CHARS: usize = 11;

/// Leading bullet glyphs, then an optional number followed by `.`, `)`, `:` or `-`
/// and whitespace, then any leftover bold markers.
///
/// The whitespace keeps decimals and ranges (`1.5 billion`, `3-4 storms`) intact.
static ENUMERATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-*•–]*\s*(?:\d{1,3}\s*[.):-]+\**(?:\s+|$))?\s*\**\s*")
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    None,
    Answer,
    Summary,
}

/// Classification of one trimmed reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// `ANSWER:` line; carries the remainder after the marker.
    AnswerMarker(&'a str),
    SummaryMarker,
    /// Starts with a digit or bullet glyph.
    Enumerated(&'a str),
    Text(&'a str),
}

pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }
    if let Some(rest) = line.strip_prefix(ANSWER_MARKER) {
        return LineKind::AnswerMarker(rest.trim());
    }
    if line.starts_with(SUMMARY_MARKER) {
        return LineKind::SummaryMarker;
    }
    match line.chars().next() {
        Some(c) if c.is_ascii_digit() || matches!(c, '-' | '*' | '•' | '–') => {
            LineKind::Enumerated(line)
        }
        _ => LineKind::Text(line),
    }
}

/// Strip the enumeration marker; `None` when what is left is too short.
pub fn clean_point(line: &str) -> Option<String> {
    let cleaned = ENUMERATION_RE.replace(line, "");
    let cleaned = cleaned.trim();
    (cleaned.chars().count() >= MIN_POINT_CHARS).then(|| cleaned.to_string())
}

/// Raw scan result, before padding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub answer: String,
    pub points: Vec<String>,
}

pub fn parse_response(reply: &str) -> ParsedResponse {
    let mut state = ParserState::None;
    let mut parsed = ParsedResponse::default();

    for line in reply.lines() {
        match (state, classify(line)) {
            (_, LineKind::Blank) => {}
            (ParserState::Summary, LineKind::AnswerMarker(_)) => {}
            (_, LineKind::AnswerMarker(rest)) => {
                state = ParserState::Answer;
                parsed.answer = rest.to_string();
            }
            (_, LineKind::SummaryMarker) => state = ParserState::Summary,
            (ParserState::Answer, LineKind::Enumerated(text) | LineKind::Text(text)) => {
                if !parsed.answer.is_empty() {
                    parsed.answer.push(' ');
                }
                parsed.answer.push_str(text);
            }
            (ParserState::Summary, LineKind::Enumerated(text)) => {
                if let Some(point) = clean_point(text) {
                    parsed.points.push(point);
                }
            }
            (ParserState::Summary, LineKind::Text(_)) | (ParserState::None, _) => {}
        }
    }

    parsed
}

pub fn filler_point(keyword: &str) -> String {
    format!("{keyword} is an important topic that requires further exploration.")
}

/// Apply the shape guarantees: non-empty answer, exactly five points.
pub fn finalize(parsed: ParsedResponse, keyword: &str) -> (String, Vec<String>) {
    let answer = if parsed.answer.trim().is_empty() {
        format!(
            "Based on the available information, {keyword} is a significant topic with various aspects to explore."
        )
    } else {
        parsed.answer
    };

    let mut points = parsed.points;
    points.truncate(SUMMARY_POINT_COUNT);
    while points.len() < SUMMARY_POINT_COUNT {
        points.push(filler_point(keyword));
    }

    (answer, points)
}
