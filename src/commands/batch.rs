use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use mivzak::batch::detect_lines;
use mivzak::config::Config;

use super::load_engine;

/// Parameters for the batch command
pub struct BatchParams {
    /// JSON-lines file of articles
    pub input: PathBuf,
    /// Output JSON-lines file, stdout when unset
    pub output: Option<PathBuf>,
    /// Documents processed at the same time
    pub concurrency: usize,
    /// Strip HTML and URLs before matching
    pub clean: bool,
}

/// Run detection over every line of a JSON-lines file
pub async fn batch(config: &Config, params: BatchParams) -> Result<()> {
    let raw = tokio::fs::read_to_string(&params.input)
        .await
        .with_context(|| format!("Failed to read input: {}", params.input.display()))?;

    let (detector, roster) = load_engine(config)?;
    let report = detect_lines(
        Arc::new(detector),
        Arc::new(roster),
        &raw,
        params.concurrency,
        params.clean,
    )
    .await;

    let mut out: Box<dyn Write> = match &params.output {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create output: {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };

    for result in &report.results {
        let line = serde_json::to_string(result).context("Failed to serialize result")?;
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    if params.output.is_some() {
        println!(
            "Processed {}/{} articles ({} with mentions)",
            report.results.len(),
            report.total,
            report.with_mentions()
        );
    }

    Ok(())
}
