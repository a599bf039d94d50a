//! topicbrief CLI — keyword research briefs from encyclopedia sources.
//!
//! Gathers page summaries for a topic, asks a language model for a direct
//! answer and five key points, highlights named entities, and writes the
//! result as a Markdown or HTML report.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
