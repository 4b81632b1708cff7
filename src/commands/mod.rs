pub mod batch;
pub mod detect;
pub mod images;
pub mod rules;

// Re-export command functions for convenience
pub use batch::{batch, BatchParams};
pub use detect::{detect, DetectParams};
pub use images::images;
pub use rules::rules;

use anyhow::Result;
use mivzak::config::Config;
use mivzak::detection::{MentionDetector, Roster};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Detector and roster built from configuration
pub fn load_engine(config: &Config) -> Result<(MentionDetector, Roster)> {
    let rules = config.load_rules()?;
    let detector = MentionDetector::new(&rules, &config.detection);
    let roster = config.load_roster();

    tracing::info!(
        rules_version = %detector.rules_version(),
        politicians = roster.len(),
        "Detection engine ready"
    );
    if roster.is_empty() {
        tracing::warn!(path = %config.paths.roster.display(), "Roster is empty, nothing will be detected");
    }

    Ok((detector, roster))
}
