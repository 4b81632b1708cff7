//! Relevance scoring
//!
//! Each detected politician gets an additive score from where and how it was
//! mentioned. Weak detections (a single late mention deep in the body) are
//! filtered by a global threshold, with per-name overrides for people tracked
//! at lower salience.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregator::{DetectionCandidate, MatchKind, SourceField};

/// Default chars from the content start that count as "early"
pub const DEFAULT_EARLY_CONTENT_CHARS: usize = 500;

/// Default max distance in chars to a quotation mark
pub const DEFAULT_QUOTE_PROXIMITY: usize = 50;

/// Default global inclusion threshold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.2;

/// Tolerance for float accumulation when comparing with a threshold
const SCORE_EPSILON: f64 = 1e-9;

/// How a politician was detected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Name,
    Alias,
    Position,
    /// Quoted speech (inside quotes, `name: "…"`, `"…" אמר name`)
    SpecialPattern,
    /// Headline speaker pattern (`name: …`)
    ColonPattern,
}

impl From<MatchKind> for DetectionMethod {
    fn from(kind: MatchKind) -> Self {
        match kind {
            MatchKind::Name => DetectionMethod::Name,
            MatchKind::Alias => DetectionMethod::Alias,
            MatchKind::Position => DetectionMethod::Position,
        }
    }
}

/// Additive weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub title: f64,
    pub description: f64,
    pub content_base: f64,
    /// Bonus for each content occurrence after the first
    pub per_extra_occurrence: f64,
    /// Upper bound of the occurrence bonus
    pub occurrence_bonus_cap: f64,
    pub early_in_content: f64,
    pub near_quote: f64,
    pub special_pattern: f64,
    pub colon_pattern: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: 0.5,
            description: 0.25,
            content_base: 0.1,
            per_extra_occurrence: 0.05,
            occurrence_bonus_cap: 0.2,
            early_in_content: 0.1,
            near_quote: 0.05,
            special_pattern: 0.15,
            colon_pattern: 0.1,
        }
    }
}

impl ScoringWeights {
    /// All weights as `(field, value)` pairs, for validation
    pub fn entries(&self) -> [(&'static str, f64); 9] {
        [
            ("title", self.title),
            ("description", self.description),
            ("content_base", self.content_base),
            ("per_extra_occurrence", self.per_extra_occurrence),
            ("occurrence_bonus_cap", self.occurrence_bonus_cap),
            ("early_in_content", self.early_in_content),
            ("near_quote", self.near_quote),
            ("special_pattern", self.special_pattern),
            ("colon_pattern", self.colon_pattern),
        ]
    }
}

/// Fields a politician was mentioned in
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MentionLocations {
    pub title: bool,
    pub description: bool,
    pub content: bool,
}

impl MentionLocations {
    fn mark(&mut self, field: SourceField) {
        match field {
            SourceField::Title => self.title = true,
            SourceField::Description => self.description = true,
            SourceField::Content => self.content = true,
        }
    }
}

/// Aggregated evidence for one politician in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    pub locations: MentionLocations,

    /// Mentions across all fields
    pub occurrence_count: usize,

    /// Mentions in the content field
    pub content_occurrences: usize,

    /// First content mention falls before the early-content offset
    pub early_in_content: bool,

    /// Some mention lies within the quote proximity
    pub near_quote: bool,

    /// Methods in first-fired order
    pub methods: Vec<DetectionMethod>,
}

impl Evidence {
    fn add_method(&mut self, method: DetectionMethod) {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
    }

    pub fn has_method(&self, method: DetectionMethod) -> bool {
        self.methods.contains(&method)
    }
}

/// A politician with its score and evidence summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPolitician {
    pub name: String,
    pub score: f64,
    pub detection_methods: Vec<DetectionMethod>,
    pub mention_locations: MentionLocations,
    pub occurrence_count: usize,
    pub early_in_content: bool,
    pub near_quote: bool,
}

/// Turns detection candidates into scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
    early_content_chars: usize,
    quote_proximity: usize,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(
            ScoringWeights::default(),
            DEFAULT_EARLY_CONTENT_CHARS,
            DEFAULT_QUOTE_PROXIMITY,
        )
    }
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights, early_content_chars: usize, quote_proximity: usize) -> Self {
        Self {
            weights,
            early_content_chars,
            quote_proximity,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Group candidates per politician, keeping first-detection order
    pub fn collect_evidence(&self, candidates: &[DetectionCandidate]) -> Vec<(String, Evidence)> {
        let mut grouped: Vec<(String, Evidence)> = Vec::new();

        for candidate in candidates {
            let idx = match grouped.iter().position(|(n, _)| *n == candidate.politician) {
                Some(i) => i,
                None => {
                    grouped.push((candidate.politician.clone(), Evidence::default()));
                    grouped.len() - 1
                }
            };
            let evidence = &mut grouped[idx].1;

            evidence.locations.mark(candidate.field);
            evidence.occurrence_count += 1;
            evidence.add_method(candidate.kind.into());

            if candidate.field == SourceField::Content {
                if evidence.content_occurrences == 0 && candidate.offset < self.early_content_chars {
                    evidence.early_in_content = true;
                }
                evidence.content_occurrences += 1;
            }
            if candidate
                .quote_distance
                .is_some_and(|d| d <= self.quote_proximity)
            {
                evidence.near_quote = true;
            }
            if candidate.speech_pattern {
                evidence.add_method(DetectionMethod::SpecialPattern);
            }
            if candidate.colon_pattern {
                evidence.add_method(DetectionMethod::ColonPattern);
            }
        }

        grouped
    }

    /// Additive score for one politician, clamped to `[0, 1]`
    pub fn score(&self, name: &str, evidence: &Evidence) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        if evidence.locations.title {
            score += w.title;
        }
        if evidence.locations.description {
            score += w.description;
        }
        if evidence.locations.content {
            let extra = evidence.content_occurrences.saturating_sub(1) as f64;
            score += w.content_base + (extra * w.per_extra_occurrence).min(w.occurrence_bonus_cap);
        }
        if evidence.early_in_content {
            score += w.early_in_content;
        }
        if evidence.near_quote {
            score += w.near_quote;
        }
        if evidence.has_method(DetectionMethod::SpecialPattern) {
            score += w.special_pattern;
        }
        if evidence.has_method(DetectionMethod::ColonPattern) {
            score += w.colon_pattern;
        }

        let score = score.clamp(0.0, 1.0);
        tracing::trace!(name, score, "Scored politician");
        score
    }

    /// Score every politician found in `candidates`, in detection order
    pub fn score_candidates(&self, candidates: &[DetectionCandidate]) -> Vec<ScoredPolitician> {
        self.collect_evidence(candidates)
            .into_iter()
            .map(|(name, evidence)| ScoredPolitician {
                score: self.score(&name, &evidence),
                name,
                detection_methods: evidence.methods,
                mention_locations: evidence.locations,
                occurrence_count: evidence.occurrence_count,
                early_in_content: evidence.early_in_content,
                near_quote: evidence.near_quote,
            })
            .collect()
    }
}

/// Keep politicians at or above their threshold, best first
///
/// Ties keep the input (detection) order.
pub fn rank_by_relevance(
    scored: &[ScoredPolitician],
    threshold: f64,
    overrides: &BTreeMap<String, f64>,
) -> Vec<ScoredPolitician> {
    let mut kept: Vec<ScoredPolitician> = scored
        .iter()
        .filter(|s| {
            let limit = overrides.get(&s.name).copied().unwrap_or(threshold);
            s.score + SCORE_EPSILON >= limit
        })
        .cloned()
        .collect();
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept
}

/// Names of politicians that pass the relevance filter, best first
pub fn filter_by_relevance(
    scored: &[ScoredPolitician],
    threshold: f64,
    overrides: &BTreeMap<String, f64>,
) -> Vec<String> {
    rank_by_relevance(scored, threshold, overrides)
        .into_iter()
        .map(|s| s.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, field: SourceField, offset: usize) -> DetectionCandidate {
        DetectionCandidate {
            politician: name.to_string(),
            surface: name.to_string(),
            kind: MatchKind::Name,
            field,
            offset,
            length: name.chars().count(),
            in_quotes: false,
            quote_distance: None,
            speech_pattern: false,
            colon_pattern: false,
        }
    }

    fn scored(name: &str, score: f64) -> ScoredPolitician {
        ScoredPolitician {
            name: name.to_string(),
            score,
            detection_methods: vec![DetectionMethod::Name],
            mention_locations: MentionLocations::default(),
            occurrence_count: 1,
            early_in_content: false,
            near_quote: false,
        }
    }

    #[test]
    fn test_title_beats_single_content_mention() {
        let scorer = RelevanceScorer::default();
        let title = scorer.score_candidates(&[candidate("א", SourceField::Title, 0)]);
        let content = scorer.score_candidates(&[candidate("א", SourceField::Content, 0)]);
        assert!(title[0].score > content[0].score);
    }

    #[test]
    fn test_additive_weights() {
        let scorer = RelevanceScorer::default();
        let mut quoted = candidate("א", SourceField::Content, 10);
        quoted.quote_distance = Some(3);
        quoted.speech_pattern = true;
        let result = scorer.score_candidates(&[
            candidate("א", SourceField::Description, 0),
            quoted,
            candidate("א", SourceField::Content, 900),
        ]);
        // description + content base + 1 extra + early + near quote + special
        let expected = 0.25 + 0.1 + 0.05 + 0.1 + 0.05 + 0.15;
        assert!((result[0].score - expected).abs() < 1e-9);
        assert_eq!(result[0].occurrence_count, 3);
        assert_eq!(
            result[0].detection_methods,
            vec![DetectionMethod::Name, DetectionMethod::SpecialPattern]
        );
    }

    #[test]
    fn test_occurrence_bonus_capped() {
        let scorer = RelevanceScorer::default();
        let many: Vec<_> = (0..20)
            .map(|i| candidate("א", SourceField::Content, 1000 + i * 10))
            .collect();
        let result = scorer.score_candidates(&many);
        assert!((result[0].score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_score_clamped() {
        let scorer = RelevanceScorer::default();
        let mut title = candidate("א", SourceField::Title, 0);
        title.colon_pattern = true;
        title.speech_pattern = true;
        title.quote_distance = Some(0);
        let result = scorer.score_candidates(&[
            title,
            candidate("א", SourceField::Description, 0),
            candidate("א", SourceField::Content, 0),
        ]);
        assert_eq!(result[0].score, 1.0);
    }

    #[test]
    fn test_early_uses_first_content_mention() {
        let scorer = RelevanceScorer::default();
        let evidence = scorer.collect_evidence(&[
            candidate("א", SourceField::Content, 800),
            candidate("א", SourceField::Content, 20),
        ]);
        assert!(!evidence[0].1.early_in_content);
    }

    #[test]
    fn test_filter_threshold_and_overrides() {
        let list = vec![scored("א", 0.1), scored("ב", 0.6), scored("ג", 0.2), scored("ד", 0.05)];
        let mut overrides = BTreeMap::new();
        overrides.insert("ד".to_string(), 0.05);
        assert_eq!(filter_by_relevance(&list, 0.2, &overrides), vec!["ב", "ג", "ד"]);
        assert!(filter_by_relevance(&list, 0.9, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_ties_keep_detection_order() {
        let list = vec![scored("א", 0.5), scored("ב", 0.7), scored("ג", 0.5)];
        assert_eq!(filter_by_relevance(&list, 0.0, &BTreeMap::new()), vec!["ב", "א", "ג"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(scored("א", 0.5)).unwrap();
        assert!(json.get("detectionMethods").is_some());
        assert!(json.get("mentionLocations").is_some());
        assert!(json.get("occurrenceCount").is_some());
        assert_eq!(json["detectionMethods"][0], "name");
    }
}
