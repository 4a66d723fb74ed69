// WHY: one invocation end to end (read, reflow, write) so the CLI and tests share
// exactly the same ordering guarantees around failures

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::document;
use crate::reflow::{ParagraphReflower, ReflowRules, ReflowStats};

/// Configuration for a single reflow run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Merge and separator rules
    pub rules: ReflowRules,
    /// Paragraphs fed to the reflower between progress updates
    pub chunk_size: usize,
    /// Whether to draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: ReflowRules::default(),
            chunk_size: 100,
            show_progress: true,
        }
    }
}

/// Statistics for one run, written by `--stats-out`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Input document path
    pub input: String,
    /// Output document path
    pub output: String,
    /// Reflow counters
    pub reflow: ReflowStats,
    /// Input document size in bytes
    pub input_bytes: u64,
    /// Output document size in bytes
    pub output_bytes: u64,
    /// Time spent reading the input in milliseconds
    pub read_time_ms: u64,
    /// Time spent reflowing in milliseconds
    pub reflow_time_ms: u64,
    /// Time spent writing the output in milliseconds
    pub write_time_ms: u64,
    /// Wall time for the whole run in milliseconds
    pub total_time_ms: u64,
}

fn progress_bar(total: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("=> "));
    progress_bar
}

/// Whether two paths name the same existing file, however they are spelled
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        // A missing output cannot be the input; a missing input fails on read
        _ => false,
    }
}

/// Reflow every paragraph of `input` and write the result to `output`
///
/// The input is fully read before anything is written, and the output appears
/// only once it is complete; on error no output file is produced.
pub async fn reflow_document(
    input: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<RunStats> {
    let run_start = std::time::Instant::now();

    config.rules.validate().context("Invalid reflow rules")?;
    if config.chunk_size == 0 {
        anyhow::bail!("Chunk size must be at least 1");
    }
    // WHY: replacing the source in place would lose it if the rules turn out wrong
    if is_same_file(input, output) {
        anyhow::bail!("Input and output must be different files: {}", input.display());
    }

    info!("Reflowing {} -> {}", input.display(), output.display());

    let (paragraphs, read_stats) = document::read_paragraphs_async(input)
        .await
        .with_context(|| format!("Failed to read input document {}", input.display()))?;

    let reflow_start = std::time::Instant::now();
    let progress = if config.show_progress {
        progress_bar(paragraphs.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_message("Reflowing");

    // WHY: chunks only pace the progress bar; the reflower keeps merge state across them
    let mut reflower = ParagraphReflower::new(&config.rules);
    for chunk in paragraphs.chunks(config.chunk_size) {
        reflower.extend(chunk);
        progress.inc(chunk.len() as u64);
    }
    let (cleaned, reflow_stats) = reflower.finish();
    progress.finish_and_clear();
    let reflow_time_ms = reflow_start.elapsed().as_millis() as u64;

    info!(
        paragraphs_in = reflow_stats.paragraphs_in,
        paragraphs_out = reflow_stats.paragraphs_out,
        merged = reflow_stats.merged,
        separators = reflow_stats.separators,
        empty_dropped = reflow_stats.empty_dropped,
        "Reflow completed"
    );

    let write_stats = document::write_paragraphs_async(output, cleaned)
        .await
        .with_context(|| format!("Failed to write output document {}", output.display()))?;

    Ok(RunStats {
        input: input.display().to_string(),
        output: output.display().to_string(),
        reflow: reflow_stats,
        input_bytes: read_stats.bytes,
        output_bytes: write_stats.bytes,
        read_time_ms: read_stats.duration_ms,
        reflow_time_ms,
        write_time_ms: write_stats.duration_ms,
        total_time_ms: run_start.elapsed().as_millis() as u64,
    })
}

/// Write run statistics as pretty JSON
pub async fn write_stats(path: &Path, stats: &RunStats) -> Result<()> {
    let content = serde_json::to_string_pretty(stats)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write stats file {}", path.display()))?;
    Ok(())
}
