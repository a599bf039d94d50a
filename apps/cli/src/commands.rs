//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use topicbrief_core::{Collaborators, ProgressReporter, ResearchReport, research};
use topicbrief_entities::RecognizerHandle;
use topicbrief_llm::ModelHandle;
use topicbrief_render::{RenderedReport, renderer_for};
use topicbrief_shared::{AppConfig, ReportFormat, TopicBriefError, init_config, load_config};
use topicbrief_sources::{WikipediaOptions, WikipediaSource};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// topicbrief — AI research briefs for any topic.
#[derive(Parser)]
#[command(
    name = "topicbrief",
    version,
    about = "Research a topic: encyclopedia sources, an AI answer, and a downloadable report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Report format flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum FormatArg {
    Markdown,
    Html,
    Pdf,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Pdf => ReportFormat::Pdf,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research a keyword and print the result.
    Search {
        /// Topic keyword (multiple words are joined).
        #[arg(required = true)]
        keyword: Vec<String>,
    },

    /// Research a keyword and write a report file.
    Report {
        /// Topic keyword (multiple words are joined).
        #[arg(required = true)]
        keyword: Vec<String>,

        /// Report format (defaults to `output.format` from config).
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Output directory (defaults to `output.dir` from config).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check that the source, model and recognizer are reachable.
    Check,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "topicbrief=info",
        1 => "topicbrief=debug",
        _ => "topicbrief=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so report output on stdout stays clean.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Search { keyword } => cmd_search(&keyword.join(" ")).await,
        Command::Report {
            keyword,
            format,
            out,
        } => cmd_report(&keyword.join(" "), format.map(Into::into), out).await,
        Command::Check => cmd_check().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Build the collaborators from config. Model and recognizer degrade to
/// `Unavailable`; only the source client is required.
fn build_collaborators(config: &AppConfig) -> Result<Collaborators> {
    let source = WikipediaSource::new(&WikipediaOptions::from(&config.source))?;
    Ok(Collaborators {
        source: Arc::new(source),
        model: ModelHandle::from_config(&config.llm),
        recognizer: RecognizerHandle::from_config(&config.entities),
    })
}

async fn run_research(config: &AppConfig, keyword: &str) -> Result<ResearchReport> {
    let collaborators = build_collaborators(config)?;
    let reporter = CliProgress::new();
    let result = research(keyword, &collaborators, &reporter).await;
    reporter.finish();
    Ok(result?)
}

async fn cmd_search(keyword: &str) -> Result<()> {
    let config = load_config()?;
    info!(keyword, "searching");

    let report = run_research(&config, keyword).await?;

    println!();
    println!("  {}", report.document.title);
    println!();
    println!("  AI Answer");
    println!("  {}", report.synthesis.answer);
    println!();
    println!("  Key Points");
    for (i, point) in report.synthesis.summary_points.iter().enumerate() {
        println!("  {}. {point}", i + 1);
    }
    println!();

    if report.outcome.is_empty() {
        println!("  No sources were found for {}.", report.keyword);
    } else {
        println!("  Sources");
        for (i, page) in report.outcome.pages.iter().enumerate() {
            println!("  {}. {}", i + 1, page.title);
            println!("     {}", page.url);
            println!("     {}", page.summary);
        }
    }
    println!();

    println!("  Additional References");
    for reference in &report.references {
        println!("  - {} ({})", reference.title, reference.category);
        println!("    {}", reference.url);
    }
    println!();
    println!(
        "  Time: {:.1}s  Request: {}",
        report.elapsed.as_secs_f64(),
        report.request_id
    );
    println!();

    Ok(())
}

async fn cmd_report(
    keyword: &str,
    format: Option<ReportFormat>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;
    let format = format.unwrap_or(config.output.format);
    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));

    info!(keyword, format = format.extension(), out = %out_dir.display(), "building report");

    let report = run_research(&config, keyword).await?;
    let rendered = renderer_for(format).render(&report.document)?;
    let path = write_report(&out_dir, &rendered)?;

    info!(
        request_id = %report.request_id,
        path = %path.display(),
        bytes = rendered.size_bytes(),
        "report written"
    );

    println!();
    println!("  Report written!");
    println!("  Keyword: {}", report.keyword);
    println!("  Sources: {}", report.sources.len());
    println!("  Path:    {}", path.display());
    println!("  Size:    {} bytes", rendered.size_bytes());
    println!("  SHA-256: {}", rendered.sha256);
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// Write the report atomically (temp file, then rename) into `dir`.
fn write_report(dir: &Path, report: &RenderedReport) -> topicbrief_shared::Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| TopicBriefError::io(dir, e))?;

    let target = dir.join(&report.filename);
    let temp = dir.join(format!(".{}.tmp", report.filename));

    if let Err(e) = std::fs::write(&temp, &report.bytes) {
        let _ = std::fs::remove_file(&temp);
        return Err(TopicBriefError::io(&temp, e));
    }
    if let Err(e) = std::fs::rename(&temp, &target) {
        if let Err(cleanup) = std::fs::remove_file(&temp) {
            warn!(path = %temp.display(), error = %cleanup, "could not remove temp file");
        }
        return Err(TopicBriefError::io(&target, e));
    }

    Ok(target)
}

async fn cmd_check() -> Result<()> {
    let config = load_config()?;
    let collaborators = build_collaborators(&config)?;
    let mut healthy = true;

    println!();
    match collaborators.source.search("Wikipedia", 1).await {
        Ok(_) => println!("  Source:     ok ({})", config.source.api_url),
        Err(e) => {
            healthy = false;
            println!("  Source:     FAILED ({e})");
        }
    }

    match &collaborators.model {
        ModelHandle::Available(model) => match topicbrief_llm::probe(model.as_ref()).await {
            Ok(_) => println!("  Model:      ok ({})", model.name()),
            Err(e) => {
                healthy = false;
                println!("  Model:      FAILED ({e})");
            }
        },
        ModelHandle::Unavailable { reason } => {
            println!("  Model:      unavailable ({reason}), templated answers only");
        }
    }

    match &collaborators.recognizer {
        RecognizerHandle::Available(recognizer) => {
            match recognizer.recognize("Paris is in France").await {
                Ok(spans) => println!(
                    "  Recognizer: ok ({}, {} entities in sample)",
                    recognizer.name(),
                    spans.len()
                ),
                Err(e) => {
                    healthy = false;
                    println!("  Recognizer: FAILED ({e})");
                }
            }
        }
        RecognizerHandle::Unavailable { reason } => {
            println!("  Recognizer: unavailable ({reason}), summaries left unannotated");
        }
    }
    println!();

    if healthy {
        Ok(())
    } else {
        warn!("one or more collaborators failed their check");
        Err(eyre!("collaborator check failed"))
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    /// Clear the spinner whether or not the pipeline reached `done`.
    fn finish(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_fetched(&self, title: &str, collected: usize, max: usize) {
        self.spinner
            .set_message(format!("Fetching sources [{collected}/{max}] {title}"));
    }

    fn done(&self, _report: &ResearchReport) {
        self.spinner.finish_and_clear();
    }
}
