//! mivzak - Politician mention detection for Hebrew news
//!
//! Decides which tracked politicians a news article mentions, by canonical
//! name, alias or office title, and how relevant each one is to the article.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`batch`] - Parallel detection over JSON-lines article files
//! - [`config`] - Configuration management and settings
//! - [`detection`] - Normalization, matching, position resolution and scoring
//! - [`models`] - Article input type
//! - [`error`] - Unified error type and categories
//!
//! # Example
//!
//! ```no_run
//! use mivzak::config::Config;
//! use mivzak::detection::MentionDetector;
//! use mivzak::models::Article;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let detector = MentionDetector::new(&config.load_rules()?, &config.detection);
//!     let roster = config.load_roster();
//!
//!     let article = Article::from_content("ראש הממשלה נפגש היום עם שר האוצר");
//!     let result = detector.detect_document(&article, &roster);
//!     println!("{:?}", result.mentioned_politicians);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::detection::{
        DetectionConfig, DetectionResult, MentionDetector, PoliticianRecord, Roster, RuleSet,
        ScoredPolitician,
    };
    pub use crate::error::{Error, ErrorCategory, MivzakErrorTrait, Result};
    pub use crate::models::Article;
}

// Direct re-exports for convenience
pub use detection::{DetectionResult, MentionDetector, Roster};
pub use models::Article;
