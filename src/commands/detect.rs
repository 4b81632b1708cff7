use anyhow::{Context, Result};
use std::path::PathBuf;

use mivzak::config::Config;
use mivzak::detection::{CleanOptions, DetectionResult};
use mivzak::models::Article;

use super::{load_engine, OutputFormat};

/// Parameters for the detect command
pub struct DetectParams {
    /// Article JSON file
    pub input: Option<PathBuf>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    /// Strip HTML and URLs before matching
    pub clean: bool,
    pub format: OutputFormat,
}

pub fn detect(config: &Config, params: DetectParams) -> Result<()> {
    let mut article = match &params.input {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read article: {}", path.display()))?;
            serde_json::from_str::<Article>(&raw)
                .with_context(|| format!("Failed to parse article JSON: {}", path.display()))?
        }
        None => Article::default(),
    };

    // Flags override fields from the file
    if params.title.is_some() {
        article.title = params.title;
    }
    if params.description.is_some() {
        article.description = params.description;
    }
    if params.content.is_some() {
        article.content = params.content;
    }

    if params.clean {
        article = article.cleaned(CleanOptions::default());
    }

    if article.is_empty() {
        tracing::warn!("Article has no text, nothing to detect");
    }

    let (detector, roster) = load_engine(config)?;
    let result = detector.detect_document(&article, &roster);

    match params.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
            println!("{json}");
        }
        OutputFormat::Text => print_text(&result),
    }

    Ok(())
}

fn print_text(result: &DetectionResult) {
    if result.is_empty() {
        println!("No politicians detected.");
        return;
    }

    println!("Mentioned politicians: {}", result.mentioned_politicians.join(", "));
    println!();
    for detection in &result.detections {
        let kept = result.mentioned_politicians.contains(&detection.name);
        let locations = [
            ("title", detection.mention_locations.title),
            ("description", detection.mention_locations.description),
            ("content", detection.mention_locations.content),
        ]
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("/");
        let methods = detection
            .detection_methods
            .iter()
            .map(|m| format!("{m:?}"))
            .collect::<Vec<_>>()
            .join(", ");

        println!(
            "  {} {:<24} score {:.2}  x{}  [{}]  ({})",
            if kept { "+" } else { "-" },
            detection.name,
            detection.score,
            detection.occurrence_count,
            locations,
            methods
        );
    }
}
