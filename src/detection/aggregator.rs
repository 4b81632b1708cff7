//! Mention aggregation
//!
//! [`MentionDetector`] runs the whole pipeline over one document:
//!
//! 1. Normalize and index each field (title, description, content)
//! 2. Per roster entry, boundary-match the name and every alias long enough
//!    to be meaningful, keeping only context-validated hits
//! 3. Resolve office titles to their current holders
//! 4. Merge everything into one candidate list, one politician per entry in
//!    the final result regardless of how many routes found it
//! 5. Score and filter by relevance

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::boundary::{is_boundary_char, BoundaryMatcher, MatchPosition};
use super::config::DetectionConfig;
use super::context::ContextValidator;
use super::normalize::normalize;
use super::position::PositionResolver;
use super::roster::{Roster, RosterEntry};
use super::rules::RuleSet;
use super::scoring::{filter_by_relevance, RelevanceScorer, ScoredPolitician};
use super::text::{fold_str, IndexedText};
use crate::models::Article;

/// Document field a mention came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SourceField {
    Title,
    Description,
    Content,
}

impl SourceField {
    pub const ALL: [SourceField; 3] = [
        SourceField::Title,
        SourceField::Description,
        SourceField::Content,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceField::Title => "title",
            SourceField::Description => "description",
            SourceField::Content => "content",
        }
    }
}

/// Which surface form produced a candidate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Name,
    Alias,
    Position,
}

/// One accepted mention inside a document field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionCandidate {
    /// Canonical roster name
    pub politician: String,

    /// Surface form that matched (name, alias or title)
    pub surface: String,

    pub kind: MatchKind,

    pub field: SourceField,

    /// Char offset in the normalized field
    pub offset: usize,

    /// Length in chars of the matched surface
    pub length: usize,

    /// Inside a double-quoted span
    pub in_quotes: bool,

    /// Distance in chars to the nearest quotation mark
    pub quote_distance: Option<usize>,

    /// Quoted-speech attribution around the mention
    pub speech_pattern: bool,

    /// Headline `speaker: …` pattern (title only)
    pub colon_pattern: bool,
}

/// Output for one document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Names passing the relevance filter, best first
    pub mentioned_politicians: Vec<String>,

    /// Every detected politician with its score, in detection order
    pub detections: Vec<ScoredPolitician>,

    /// Rule set the detection ran with
    pub rules_version: String,
}

impl DetectionResult {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Detection engine over an explicitly passed roster
///
/// Holds only rule-derived state, so one instance can be shared across
/// threads and documents.
#[derive(Debug, Clone)]
pub struct MentionDetector {
    rules_version: String,
    matcher: BoundaryMatcher,
    context: ContextValidator,
    positions: PositionResolver,
    scorer: RelevanceScorer,
    speech_verbs: Vec<Vec<char>>,
    min_alias_length: usize,
    confidence_threshold: f64,
    threshold_overrides: BTreeMap<String, f64>,
}

impl Default for MentionDetector {
    fn default() -> Self {
        Self::new(&RuleSet::builtin(), &DetectionConfig::default())
    }
}

impl MentionDetector {
    pub fn new(rules: &RuleSet, config: &DetectionConfig) -> Self {
        tracing::debug!(rules_version = %rules.version, "Building mention detector");
        Self {
            rules_version: rules.version.clone(),
            matcher: BoundaryMatcher::new(rules),
            context: ContextValidator::new(config.context_radius),
            positions: PositionResolver::new(rules, config.position_options()),
            scorer: RelevanceScorer::new(
                config.weights,
                config.early_content_chars,
                config.quote_proximity,
            ),
            speech_verbs: rules
                .speech_verbs
                .iter()
                .map(|v| fold_str(&normalize(v)))
                .filter(|v| !v.is_empty())
                .collect(),
            min_alias_length: config.min_alias_length,
            confidence_threshold: config.confidence_threshold,
            threshold_overrides: config.threshold_overrides.clone(),
        }
    }

    pub fn rules_version(&self) -> &str {
        &self.rules_version
    }

    pub fn matcher(&self) -> &BoundaryMatcher {
        &self.matcher
    }

    pub fn position_resolver(&self) -> &PositionResolver {
        &self.positions
    }

    /// Politicians mentioned in `text`, each once, in first-seen order
    ///
    /// Empty text or an empty roster yields an empty list.
    pub fn find_mentions(&self, text: Option<&str>, roster: &Roster) -> Vec<String> {
        let indexed = IndexedText::new(text);
        let mut names: Vec<String> = Vec::new();
        for candidate in self.field_candidates(&indexed, SourceField::Content, roster) {
            if !names.contains(&candidate.politician) {
                names.push(candidate.politician);
            }
        }
        names
    }

    /// All candidates of a document, ordered by field then offset
    pub fn collect_candidates(&self, article: &Article, roster: &Roster) -> Vec<DetectionCandidate> {
        SourceField::ALL
            .iter()
            .flat_map(|&field| {
                let text = IndexedText::new(article.field(field));
                self.field_candidates(&text, field, roster)
            })
            .collect()
    }

    /// Detect, score and filter one document
    pub fn detect_document(&self, article: &Article, roster: &Roster) -> DetectionResult {
        let candidates = self.collect_candidates(article, roster);
        let detections = self.scorer.score_candidates(&candidates);
        let mentioned_politicians = filter_by_relevance(
            &detections,
            self.confidence_threshold,
            &self.threshold_overrides,
        );

        tracing::debug!(
            id = article.id.as_deref().unwrap_or("-"),
            candidates = candidates.len(),
            detected = detections.len(),
            kept = mentioned_politicians.len(),
            "Document processed"
        );

        DetectionResult {
            id: article.id.clone(),
            mentioned_politicians,
            detections,
            rules_version: self.rules_version.clone(),
        }
    }

    /// Candidates from one indexed field, sorted by offset
    pub fn field_candidates(
        &self,
        text: &IndexedText,
        field: SourceField,
        roster: &Roster,
    ) -> Vec<DetectionCandidate> {
        if text.is_empty() || roster.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<DetectionCandidate> = Vec::new();

        for entry in roster.entries() {
            let spans = self.entry_spans(text, entry);
            for (kind, surface, pos) in spans {
                candidates.push(self.candidate(text, field, entry.name(), kind, surface, &pos));
            }
        }

        for m in self.positions.find_position_matches(text, roster) {
            // "ראש הממשלה בנימין נתניהו" is one mention, not two
            let named_alongside = candidates.iter().any(|c| {
                c.politician == m.politician && is_apposition(text, &m.position, c.offset, c.length)
            });
            if named_alongside {
                continue;
            }
            candidates.push(self.candidate(
                text,
                field,
                &m.politician,
                MatchKind::Position,
                &m.surface,
                &m.position,
            ));
        }

        candidates.sort_by_key(|c| c.offset);
        candidates
    }

    /// Context-validated name and alias spans of one politician
    ///
    /// Alias hits inside a longer accepted span of the same politician
    /// ("נתניהו" within "בנימין נתניהו") are folded into that span.
    fn entry_spans<'e>(
        &self,
        text: &IndexedText,
        entry: &'e RosterEntry,
    ) -> Vec<(MatchKind, &'e str, MatchPosition)> {
        let accepted = |pos: &MatchPosition| {
            self.context
                .has_required_context(text, entry, pos.start, pos.len())
        };

        let mut spans: Vec<(MatchKind, &'e str, MatchPosition)> = self
            .matcher
            .matches(text, entry.name())
            .filter(|p| accepted(p))
            .map(|p| (MatchKind::Name, entry.name(), p))
            .collect();

        for alias in entry.aliases() {
            if alias.chars().count() < self.min_alias_length {
                continue;
            }
            for pos in self.matcher.matches(text, alias).filter(|p| accepted(p)) {
                spans.push((MatchKind::Alias, alias.as_str(), pos));
            }
        }

        // Longest first so contained hits are dropped
        spans.sort_by(|a, b| b.2.len().cmp(&a.2.len()).then(a.2.start.cmp(&b.2.start)));
        let mut kept: Vec<(MatchKind, &'e str, MatchPosition)> = Vec::with_capacity(spans.len());
        for span in spans {
            if !kept.iter().any(|k| k.2.contains(&span.2)) {
                kept.push(span);
            }
        }
        kept.sort_by_key(|k| k.2.start);
        kept
    }

    fn candidate(
        &self,
        text: &IndexedText,
        field: SourceField,
        politician: &str,
        kind: MatchKind,
        surface: &str,
        pos: &MatchPosition,
    ) -> DetectionCandidate {
        DetectionCandidate {
            politician: politician.to_string(),
            surface: surface.to_string(),
            kind,
            field,
            offset: pos.start,
            length: pos.len(),
            in_quotes: pos.in_quotes,
            quote_distance: text.distance_to_quote(pos.token_start(), pos.end),
            speech_pattern: kind != MatchKind::Position && self.is_speech_pattern(text, pos),
            colon_pattern: field == SourceField::Title && is_colon_pattern(text, pos),
        }
    }

    /// Quoted speech around a mention:
    /// - the mention sits inside quotes
    /// - `name: "…"` or `name אמר: "…"`
    /// - `"…" אמר name`
    fn is_speech_pattern(&self, text: &IndexedText, pos: &MatchPosition) -> bool {
        if pos.in_quotes {
            return true;
        }
        self.opens_quote_after(text, pos.end) || self.attributes_quote_before(text, pos.token_start())
    }

    fn opens_quote_after(&self, text: &IndexedText, end: usize) -> bool {
        let chars = text.chars();
        let i = skip_spaces(chars, end);

        let colon = if chars.get(i) == Some(&':') {
            Some(i)
        } else {
            self.speech_verbs.iter().find_map(|verb| {
                if !chars[i..].starts_with(verb) {
                    return None;
                }
                let j = skip_spaces(chars, i + verb.len());
                (chars.get(j) == Some(&':')).then_some(j)
            })
        };
        let Some(colon) = colon else {
            return false;
        };
        let k = skip_spaces(chars, colon + 1);
        matches!(chars.get(k), Some('"') | Some('\''))
    }

    fn attributes_quote_before(&self, text: &IndexedText, token_start: usize) -> bool {
        let chars = &text.chars()[..token_start.min(text.len())];
        let end = chars.iter().rposition(|&c| c != ' ').map_or(0, |i| i + 1);
        let before = &chars[..end];

        self.speech_verbs.iter().any(|verb| {
            if !before.ends_with(verb) {
                return false;
            }
            let verb_start = before.len() - verb.len();
            if verb_start > 0 && !is_boundary_char(before[verb_start - 1]) {
                return false;
            }
            before[..verb_start]
                .iter()
                .rev()
                .find(|&&c| c != ' ' && c != ',')
                .is_some_and(|&c| c == '"' || c == '\'')
        })
    }
}

/// In a headline, the mention ends right before the first colon or comes
/// after it ("נתניהו: לא נוותר", "סערה בכנסת: לפיד תוקף")
fn is_colon_pattern(text: &IndexedText, pos: &MatchPosition) -> bool {
    let chars = text.chars();
    let Some(colon) = chars.iter().position(|&c| c == ':') else {
        return false;
    };
    if pos.token_start() > colon {
        return true;
    }
    pos.end <= colon && chars[pos.end..colon].iter().all(|&c| c == ' ')
}

/// A title directly next to a name span, separated only by spaces or a
/// comma ("שר האוצר בצלאל סמוטריץ'", "סמוטריץ', שר האוצר")
fn is_apposition(text: &IndexedText, title: &MatchPosition, offset: usize, length: usize) -> bool {
    let chars = text.chars();
    let name_end = offset + length;
    let gap = if offset >= title.end {
        &chars[title.end..offset]
    } else if name_end <= title.token_start() {
        &chars[name_end..title.token_start()]
    } else {
        return false;
    };
    !gap.is_empty() && gap.iter().all(|&c| c == ' ' || c == ',')
}

fn skip_spaces(chars: &[char], mut i: usize) -> usize {
    while chars.get(i) == Some(&' ') {
        i += 1;
    }
    i
}
