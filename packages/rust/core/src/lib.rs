//! Core pipeline orchestration and domain logic for topicbrief.
//!
//! This crate ties together source aggregation, response synthesis, entity
//! annotation, and document assembly into the end-to-end `research` workflow.

pub mod aggregator;
pub mod annotator;
pub mod assembler;
pub mod pipeline;
pub mod references;
pub mod response_parser;
pub mod synthesizer;

#[cfg(test)]
mod testing;

pub use pipeline::{
    Collaborators, ProgressReporter, ResearchReport, SilentProgress, normalize_keyword, research,
};
