//! End-to-end `research` pipeline: keyword → sources → synthesis → annotation → document.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument};
use uuid::Uuid;

use topicbrief_entities::RecognizerHandle;
use topicbrief_llm::ModelHandle;
use topicbrief_shared::{
    AggregationOutcome, DocumentTree, ReferenceEntry, Result, SourceEntry, SynthesisResult,
    TopicBriefError,
};
use topicbrief_sources::KnowledgeSource;

use crate::aggregator::aggregate_with_progress;
use crate::annotator::annotate_segments;
use crate::assembler::assemble;
use crate::references::reference_list;
use crate::synthesizer::{synthesis_context, synthesize};

/// External capabilities one research request runs against.
///
/// All three are stateless and may be shared across concurrent requests.
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn KnowledgeSource>,
    pub model: ModelHandle,
    pub recognizer: RecognizerHandle,
}

/// Everything produced for one keyword.
#[derive(Debug, Clone)]
pub struct ResearchReport {
    /// Request identifier (UUID v7), for log correlation.
    pub request_id: Uuid,
    /// Normalised keyword.
    pub keyword: String,
    pub outcome: AggregationOutcome,
    pub synthesis: SynthesisResult,
    /// Sources with entity-annotated summaries, in aggregation order.
    pub sources: Vec<SourceEntry>,
    pub references: Vec<ReferenceEntry>,
    pub document: DocumentTree,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a source page is collected.
    fn source_fetched(&self, title: &str, collected: usize, max: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &ResearchReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_fetched(&self, _title: &str, _collected: usize, _max: usize) {}
    fn done(&self, _report: &ResearchReport) {}
}

/// Trim, collapse inner whitespace, and title-case the result.
///
/// A blank keyword is a validation error.
pub fn normalize_keyword(raw: &str) -> Result<String> {
    let words: Vec<String> = raw.split_whitespace().map(title_case_word).collect();
    if words.is_empty() {
        return Err(TopicBriefError::validation("keyword must not be blank"));
    }
    Ok(words.join(" "))
}

/// Upper-case a letter that follows a non-letter, lower-case the rest, so
/// `x-ray` becomes `X-Ray` and `o'neil` becomes `O'Neil`.
fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut after_letter = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// Run the full research pipeline.
///
/// 1. Aggregate sources
/// 2. Synthesize answer and key points
/// 3. Annotate source summaries
/// 4. Build reference links
/// 5. Assemble the document tree
///
/// Collaborator failures degrade in place; only a blank keyword errors.
#[instrument(skip_all, fields(keyword = %raw_keyword))]
pub async fn research(
    raw_keyword: &str,
    collaborators: &Collaborators,
    progress: &dyn ProgressReporter,
) -> Result<ResearchReport> {
    let start = Instant::now();
    let keyword = normalize_keyword(raw_keyword)?;
    let request_id = Uuid::now_v7();

    info!(%request_id, %keyword, model = ?collaborators.model, "starting research");

    // --- Phase 1: Sources ---
    progress.phase("Searching sources");
    let outcome =
        aggregate_with_progress(collaborators.source.as_ref(), &keyword, progress).await;

    // --- Phase 2: Synthesis ---
    progress.phase("Generating AI answer");
    let context = synthesis_context(&outcome);
    let synthesis = synthesize(&collaborators.model, &keyword, &context).await;

    // --- Phase 3: Annotation ---
    progress.phase("Highlighting entities");
    let mut sources = Vec::with_capacity(outcome.len());
    for page in &outcome.pages {
        sources.push(SourceEntry {
            title: page.title.clone(),
            url: page.url.clone(),
            annotated_summary: annotate_segments(&collaborators.recognizer, &page.summary).await,
        });
    }

    // --- Phase 4: Assemble ---
    progress.phase("Assembling report");
    let references = reference_list(&keyword);
    let document = assemble(&keyword, &synthesis, &sources, &references);

    let report = ResearchReport {
        request_id,
        keyword,
        outcome,
        synthesis,
        sources,
        references,
        document,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        %request_id,
        sources = report.sources.len(),
        origin = ?report.synthesis.origin,
        elapsed_ms = report.elapsed.as_millis(),
        "research complete"
    );

    Ok(report)
}
