//! Common test utilities

use std::path::PathBuf;

use mivzak::detection::{MentionDetector, Roster};
use mivzak::models::Article;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Roster loaded from the shared fixture
pub fn fixture_roster() -> Roster {
    Roster::from_path(&fixture_path("politicians.json")).expect("fixture roster should load")
}

/// Detector with built-in rules and default configuration
pub fn detector() -> MentionDetector {
    MentionDetector::default()
}

/// Create an article with the given fields
#[allow(dead_code)]
pub fn article(title: &str, description: &str, content: &str) -> Article {
    let field = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Article {
        id: None,
        title: field(title),
        description: field(description),
        content: field(content),
    }
}
