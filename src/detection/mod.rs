//! Politician mention detection for Hebrew news text
//!
//! This module finds which tracked politicians an article mentions and how
//! strongly, using deterministic offset-indexed scanning instead of layered
//! regular expressions.
//!
//! ## Pipeline
//! - [`normalize`]: canonical quotes, dashes, letter forms and whitespace
//! - [`boundary`]: standalone-word matching with Hebrew prefixes
//! - [`context`]: corroboration for ambiguous names
//! - [`position`]: office title to current holder
//! - [`aggregator`]: merge all routes into one detection set per document
//! - [`scoring`]: relevance score and threshold filter
//!
//! Linguistic exceptions live in a versioned [`RuleSet`], and the roster is
//! an explicit immutable value passed into every call.
//!
//! ## Example
//!
//! ```
//! use mivzak::detection::{MentionDetector, PoliticianRecord, Roster};
//!
//! let roster = Roster::new(vec![
//!     PoliticianRecord::new("בנימין נתניהו")
//!         .with_aliases(&["ביבי"])
//!         .with_position("ראש הממשלה"),
//! ]);
//! let detector = MentionDetector::default();
//!
//! assert_eq!(detector.find_mentions(Some("ביבי אמר אתמול"), &roster), vec!["בנימין נתניהו"]);
//! assert!(detector.find_mentions(None, &roster).is_empty());
//! ```

pub mod aggregator;
pub mod boundary;
pub mod config;
pub mod context;
pub mod error;
pub mod images;
pub mod normalize;
pub mod position;
pub mod roster;
pub mod rules;
pub mod scoring;
pub mod text;

pub use aggregator::{DetectionCandidate, DetectionResult, MatchKind, MentionDetector, SourceField};
pub use boundary::{BoundaryMatcher, MatchPosition, HEBREW_PREFIXES};
pub use config::{DetectionConfig, DetectionConfigBuilder};
pub use context::ContextValidator;
pub use error::{DetectionError, LoadResult};
pub use images::{assign_images, list_portraits, normalize_image_key, ImageReport};
pub use normalize::{clean_text, normalize, normalize_text, CleanOptions};
pub use position::{Disqualifier, PositionMatch, PositionOptions, PositionResolver, TieBreak};
pub use roster::{PoliticianRecord, Roster, RosterEntry};
pub use rules::{ExclusionKind, ExclusionRule, PositionTitle, RuleSet, DEFAULT_RULES_VERSION};
pub use scoring::{
    filter_by_relevance, rank_by_relevance, DetectionMethod, Evidence, MentionLocations,
    RelevanceScorer, ScoredPolitician, ScoringWeights,
};
pub use text::IndexedText;
