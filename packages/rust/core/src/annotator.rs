//! Entity annotation: wrap recognised spans in highlight markup.
//!
//! Output is built in one ascending pass into a fresh buffer, so span offsets
//! always refer to the untouched input. Spans are character offsets and are
//! mapped to byte positions before slicing.

use tracing::{debug, warn};

use topicbrief_entities::RecognizerHandle;
use topicbrief_shared::{EntitySpan, TextSegment, segments_html};

/// Annotate `text` with whatever the recognizer finds, as highlight markup.
///
/// An unavailable recognizer, a recognition error or zero spans return `text`
/// unchanged.
pub async fn annotate(recognizer: &RecognizerHandle, text: &str) -> String {
    highlight(text, &recognize(recognizer, text).await)
}

/// Annotate `text` as segments, for the document tree.
pub async fn annotate_segments(recognizer: &RecognizerHandle, text: &str) -> Vec<TextSegment> {
    segments(text, &recognize(recognizer, text).await)
}

async fn recognize(recognizer: &RecognizerHandle, text: &str) -> Vec<EntitySpan> {
    let recognizer = match recognizer {
        RecognizerHandle::Available(r) => r,
        RecognizerHandle::Unavailable { .. } => return Vec::new(),
    };

    match recognizer.recognize(text).await {
        Ok(spans) => spans,
        Err(e) => {
            warn!(recognizer = recognizer.name(), error = %e, "annotation skipped");
            Vec::new()
        }
    }
}

/// Splice highlight markup for `spans` into `text`.
///
/// Text around and inside the spans is HTML-escaped. With no usable span the
/// input comes back untouched.
pub fn highlight(text: &str, spans: &[EntitySpan]) -> String {
    let segments = segments(text, spans);
    if !segments.iter().any(TextSegment::is_entity) {
        return text.to_string();
    }
    segments_html(&segments)
}

/// Split `text` into plain gaps and entity segments.
///
/// Spans that overlap an earlier span, are empty, or fall outside the text
/// are skipped. Empty gaps are not emitted.
pub fn segments(text: &str, spans: &[EntitySpan]) -> Vec<TextSegment> {
    if spans.is_empty() {
        return plain(text);
    }

    // Byte position of every char index, plus the end of the text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut ordered: Vec<&EntitySpan> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let mut out = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0usize;

    for span in ordered {
        let (Some(&start), Some(&end)) = (boundaries.get(span.start), boundaries.get(span.end))
        else {
            debug!(start = span.start, end = span.end, label = %span.label, "span out of range");
            continue;
        };
        if start >= end || start < cursor {
            debug!(start = span.start, end = span.end, label = %span.label, "span skipped");
            continue;
        }

        out.extend(plain(&text[cursor..start]));
        out.push(TextSegment::entity(&text[start..end], span.label.as_str()));
        cursor = end;
    }

    out.extend(plain(&text[cursor..]));
    out
}

fn plain(text: &str) -> Vec<TextSegment> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![TextSegment::text(text)]
    }
}
