//! Batch reprocessing of JSON-lines article files
//!
//! Each non-blank line holds one [`Article`]. Lines are detected in parallel
//! on blocking worker threads over a shared detector and roster. Results keep
//! input order, and a line that fails is logged and skipped.

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::detection::{CleanOptions, DetectionResult, MentionDetector, Roster};
use crate::error::{Error, MivzakErrorTrait, Result};
use crate::models::Article;

/// Parse one JSON line and run detection on it
pub fn detect_json_line(
    detector: &MentionDetector,
    roster: &Roster,
    line: &str,
    clean: bool,
) -> Result<DetectionResult> {
    let article: Article = serde_json::from_str(line)?;
    let article = if clean {
        article.cleaned(CleanOptions::default())
    } else {
        article
    };
    Ok(detector.detect_document(&article, roster))
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Non-blank input lines
    pub total: usize,

    /// Results of the lines that succeeded, in input order
    pub results: Vec<DetectionResult>,

    /// 1-based line numbers that were skipped
    pub skipped: Vec<usize>,
}

impl BatchReport {
    /// Documents with at least one politician kept
    pub fn with_mentions(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.mentioned_politicians.is_empty())
            .count()
    }
}

/// Run detection over every non-blank line of `input`
pub async fn detect_lines(
    detector: Arc<MentionDetector>,
    roster: Arc<Roster>,
    input: &str,
    concurrency: usize,
    clean: bool,
) -> BatchReport {
    let lines: Vec<(usize, String)> = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect();
    let total = lines.len();

    let outcomes: Vec<(usize, Result<DetectionResult>)> = stream::iter(lines)
        .map(|(line_no, line)| {
            let detector = Arc::clone(&detector);
            let roster = Arc::clone(&roster);
            async move {
                let task = tokio::task::spawn_blocking(move || {
                    detect_json_line(&detector, &roster, &line, clean)
                });
                let outcome = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(Error::with_source("Detection task panicked", e)),
                };
                (line_no, outcome)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = BatchReport {
        total,
        ..Default::default()
    };
    for (line_no, outcome) in outcomes {
        match outcome {
            Ok(result) => report.results.push(result),
            Err(e) => {
                tracing::warn!(
                    line = line_no,
                    category = ?e.category(),
                    error = %e,
                    "Skipping article"
                );
                report.skipped.push(line_no);
            }
        }
    }

    tracing::info!(
        total,
        processed = report.results.len(),
        skipped = report.skipped.len(),
        "Batch completed"
    );

    report
}
