//! Offline regex recognizer.
//!
//! Covers the entity kinds that are reliably recognisable without a model:
//! dates, monetary amounts, and percentages. Names of people, places and
//! organisations need the HTTP backend.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use topicbrief_shared::{EntitySpan, Result};

use crate::EntityRecognizer;

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December";

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:(?:{MONTHS})\s+\d{{1,2}},\s*\d{{3,4}}|\d{{1,2}}\s+(?:{MONTHS})\s+\d{{3,4}}|(?:{MONTHS})\s+\d{{3,4}}|(?:1\d{{3}}|20\d{{2}}))\b"
    ))
    .expect("valid regex")
});

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$€£¥]\s?\d[\d,]*(?:\.\d+)?(?:\s(?:thousand|million|billion|trillion)\b)?")
        .expect("valid regex")
});

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d+(?:\.\d+)?(?:%|\s?percent\b)").expect("valid regex")
});

/// Regex-based [`EntityRecognizer`] labelling `DATE`, `MONEY` and `PERCENT`.
#[derive(Debug, Clone, Default)]
pub struct PatternRecognizer;

impl PatternRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous recognition, shared by the trait impl and tests.
    pub fn find(&self, text: &str) -> Vec<EntitySpan> {
        // (byte_start, byte_end, label)
        let mut candidates: Vec<(usize, usize, &'static str)> = Vec::new();

        for (re, label) in [
            (&*MONEY_RE, "MONEY"),
            (&*PERCENT_RE, "PERCENT"),
            (&*DATE_RE, "DATE"),
        ] {
            candidates.extend(re.find_iter(text).map(|m| (m.start(), m.end(), label)));
        }

        // Earliest first; on ties the longer match wins.
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut spans = Vec::new();
        let mut last_end = 0usize;
        for (start, end, label) in candidates {
            if start < last_end {
                continue;
            }
            last_end = end;
            spans.push(EntitySpan::new(
                char_offset(text, start),
                char_offset(text, end),
                label,
                &text[start..end],
            ));
        }

        spans
    }
}

/// Convert a byte index (on a char boundary) to a character offset.
fn char_offset(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

#[async_trait]
impl EntityRecognizer for PatternRecognizer {
    fn name(&self) -> &str {
        "pattern"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        Ok(self.find(text))
    }
}
