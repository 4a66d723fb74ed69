use anyhow::Result;
use clap::Parser;
use reflow::{pipeline, PipelineConfig, ReflowRules};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "reflow")]
#[command(about = "Merge mid-sentence paragraph splits and normalize spacing in .docx documents")]
#[command(version)]
struct Args {
    /// Input .docx document
    input: PathBuf,

    /// Output .docx document
    output: PathBuf,

    /// Heading keyword marking a chapter/part separator (repeatable, replaces the defaults)
    #[arg(long = "heading-keyword", value_name = "KEYWORD")]
    heading_keywords: Vec<String>,

    /// Scene-break marker (repeatable, replaces the default "* * *")
    #[arg(long = "scene-break", value_name = "MARKER")]
    scene_breaks: Vec<String>,

    /// Paragraphs processed between progress updates
    #[arg(long, default_value_t = 100)]
    chunk_size: usize,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut rules = ReflowRules::default();
        if !self.heading_keywords.is_empty() {
            rules.heading_keywords = self.heading_keywords.clone();
        }
        if !self.scene_breaks.is_empty() {
            rules.scene_breaks = self.scene_breaks.clone();
        }
        PipelineConfig {
            rules,
            chunk_size: self.chunk_size,
            show_progress: !self.no_progress,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging on stderr keeps stdout for the summary line
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting reflow");
    info!(?args, "Parsed CLI arguments");

    // WHY: validate input early to fail with a clear error before touching the output
    if !args.input.exists() {
        anyhow::bail!("Input document does not exist: {}", args.input.display());
    }
    if !args.input.is_file() {
        anyhow::bail!("Input path is not a file: {}", args.input.display());
    }

    let config = args.pipeline_config();
    let stats = pipeline::reflow_document(&args.input, &args.output, &config).await?;

    if let Some(stats_path) = &args.stats_out {
        pipeline::write_stats(stats_path, &stats).await?;
        info!("Stats written to {}", stats_path.display());
    }

    println!(
        "reflow v{} - {} paragraphs in, {} out ({} merged, {} separators) -> {}",
        env!("CARGO_PKG_VERSION"),
        stats.reflow.paragraphs_in,
        stats.reflow.paragraphs_out,
        stats.reflow.merged,
        stats.reflow.separators,
        stats.output
    );

    info!("Completed in {}ms", stats.total_time_ms);
    Ok(())
}
