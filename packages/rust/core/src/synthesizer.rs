//! Response synthesis: aggregated context → one answer plus five key points.
//!
//! [`synthesize`] never returns an error. Every degradation (no model, model
//! failure, blank reply, unparseable reply) produces a templated
//! [`SynthesisResult`] of the same shape, tagged with its [`SynthesisOrigin`].

use tracing::{debug, info, instrument, warn};

use topicbrief_llm::{CompletionParams, ModelHandle};
use topicbrief_shared::{AggregationOutcome, SUMMARY_POINT_COUNT, SynthesisOrigin, SynthesisResult};

use crate::response_parser::{filler_point, finalize, parse_response};

/// Characters of context embedded in the prompt.
pub const CONTEXT_CHAR_LIMIT: usize = 3000;

/// Summaries placed ahead of the rich context.
const CONTEXT_SUMMARY_COUNT: usize = 3;

/// Characters of rich context placed after the summaries.
const RICH_CONTEXT_CHARS: usize = 2000;

/// Fixed sampling: bounded output, low randomness.
pub const SAMPLING: CompletionParams = CompletionParams {
    max_tokens: 800,
    temperature: 0.3,
};

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the synthesis context from an aggregation outcome: the first three
/// summaries, then the head of the rich context.
pub fn synthesis_context(outcome: &AggregationOutcome) -> String {
    let summaries = outcome
        .pages
        .iter()
        .take(CONTEXT_SUMMARY_COUNT)
        .map(|p| p.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let rich = truncate_chars(&outcome.rich_context, RICH_CONTEXT_CHARS);

    format!("{summaries} {rich}").trim().to_string()
}

pub fn build_prompt(keyword: &str, context: &str) -> String {
    let information = truncate_chars(context, CONTEXT_CHAR_LIMIT);
    format!(
        "Based on the following information about '{keyword}', please provide:

1. A direct, comprehensive answer to the question
2. Exactly 5 key summary points about the topic

Information: {information}

Question: {keyword}

Please format your response as follows:
ANSWER: [Your detailed answer here]

SUMMARY POINTS:
1. [First key point]
2. [Second key point]
3. [Third key point]
4. [Fourth key point]
5. [Fifth key point]

Make sure each summary point is informative and captures important aspects of the topic."
    )
}

/// Points shown when no model output is usable at all.
pub fn fallback_points(keyword: &str) -> Vec<String> {
    vec![
        "AI summary generation encountered an error.".to_string(),
        "Please check your internet connection and API key.".to_string(),
        "You can still use the encyclopedia sources listed below.".to_string(),
        format!("The search results contain comprehensive information about {keyword}."),
        "Consider trying the AI response again or contact support if the issue persists."
            .to_string(),
    ]
}

#[instrument(skip_all, fields(keyword = %keyword, context_chars = context.len()))]
pub async fn synthesize(model: &ModelHandle, keyword: &str, context: &str) -> SynthesisResult {
    let model = match model {
        ModelHandle::Available(model) => model,
        ModelHandle::Unavailable { reason } => {
            info!(%reason, "no language model, using templated synthesis");
            return SynthesisResult {
                answer: format!(
                    "AI model not configured ({reason}). The sources below cover {keyword}."
                ),
                summary_points: fallback_points(keyword),
                origin: SynthesisOrigin::ModelUnavailable,
            };
        }
    };

    let prompt = build_prompt(keyword, context);
    let reply = match model.complete(&prompt, SAMPLING).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(model = model.name(), error = %e, "model call failed");
            return SynthesisResult {
                answer: format!("AI response generation encountered an error: {e}"),
                summary_points: fallback_points(keyword),
                origin: SynthesisOrigin::ModelFailure,
            };
        }
    };

    if reply.trim().is_empty() {
        warn!(model = model.name(), "model returned a blank reply");
        return SynthesisResult {
            answer: format!("Could not generate AI response for {keyword}. Please try again."),
            summary_points: vec![filler_point(keyword); SUMMARY_POINT_COUNT],
            origin: SynthesisOrigin::EmptyReply,
        };
    }

    let parsed = parse_response(&reply);
    debug!(
        answer_chars = parsed.answer.len(),
        points = parsed.points.len(),
        "reply parsed"
    );
    let (answer, summary_points) = finalize(parsed, keyword);

    SynthesisResult {
        answer,
        summary_points,
        origin: SynthesisOrigin::Model,
    }
}
