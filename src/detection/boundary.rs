//! Word-boundary matching with Hebrew prefix handling
//!
//! A raw substring hit only counts as a mention when it stands on its own:
//! both neighbours must be boundary characters, or the left neighbour may be
//! a single attached prefix letter (ב ל מ ו ש ה כ) that itself follows a
//! boundary. Inside a quoted span quote marks also delimit words, so
//! `"ביבי"` matches.
//!
//! Two degenerate shapes are always rejected:
//! - hyphenated compounds (`X-name`, `name-X`), which name someone else
//! - neighbours listed in the [`RuleSet`] exclusion table
//!   (e.g. "יאיר נתניהו" for the surface "נתניהו")

use std::collections::HashMap;

use super::normalize::normalize;
use super::rules::{ExclusionKind, RuleSet};
use super::text::{fold_str, is_quote_char, IndexedText};

/// Single-letter Hebrew prefixes that attach directly to a word
pub const HEBREW_PREFIXES: [char; 7] = ['ב', 'ל', 'מ', 'ו', 'ש', 'ה', 'כ'];

/// Whether `c` delimits a word outside quoted spans
pub fn is_boundary_char(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | ';'
                | ':'
                | '!'
                | '?'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '<'
                | '>'
                | '/'
                | '\\'
                | '|'
                | '…'
                | '-'
                | '–'
                | '—'
                | '*'
                | '•'
                | '·'
        )
}

pub fn is_hebrew_prefix(c: char) -> bool {
    HEBREW_PREFIXES.contains(&c)
}

/// One accepted occurrence of a target in an [`IndexedText`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPosition {
    /// Offset of the target itself (after any prefix)
    pub start: usize,

    /// Offset one past the last matched char
    pub end: usize,

    /// Attached prefix letter, if the hit was prefixed
    pub prefix: Option<char>,

    /// Hit lies inside a double-quoted span
    pub in_quotes: bool,
}

impl MatchPosition {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Start of the whole token including its prefix
    pub fn token_start(&self) -> usize {
        if self.prefix.is_some() {
            self.start - 1
        } else {
            self.start
        }
    }

    /// Whether two spans share at least one char
    pub fn overlaps(&self, other: &MatchPosition) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this span
    pub fn contains(&self, other: &MatchPosition) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone)]
struct CompiledExclusion {
    kind: ExclusionKind,
    word: Vec<char>,
}

/// Boundary-aware matcher with a compiled exclusion table
#[derive(Debug, Clone, Default)]
pub struct BoundaryMatcher {
    exclusions: HashMap<Vec<char>, Vec<CompiledExclusion>>,
}

impl BoundaryMatcher {
    /// Compile the exclusion table of a rule set
    pub fn new(rules: &RuleSet) -> Self {
        let mut exclusions: HashMap<Vec<char>, Vec<CompiledExclusion>> = HashMap::new();
        for rule in &rules.exclusions {
            let surface = fold_str(&normalize(&rule.surface));
            let word = fold_str(&normalize(&rule.word));
            if surface.is_empty() || word.is_empty() {
                continue;
            }
            exclusions.entry(surface).or_default().push(CompiledExclusion {
                kind: rule.kind,
                word,
            });
        }
        Self { exclusions }
    }

    /// A matcher without any exclusions (used for titles and markers)
    pub fn plain() -> Self {
        Self::default()
    }

    /// True if `target` occurs as a standalone mention in `text`
    pub fn is_match(&self, text: &IndexedText, target: &str) -> bool {
        self.matches(text, target).next().is_some()
    }

    /// Convenience wrapper that normalizes `text` first
    pub fn is_match_str(&self, text: &str, target: &str) -> bool {
        self.is_match(&IndexedText::new(Some(text)), target)
    }

    /// Every accepted occurrence of `target`, in text order
    pub fn find_all_match_positions(&self, text: &IndexedText, target: &str) -> Vec<MatchPosition> {
        self.matches(text, target).collect()
    }

    /// Lazily enumerate accepted occurrences
    pub fn matches<'a>(
        &'a self,
        text: &'a IndexedText,
        target: &str,
    ) -> impl Iterator<Item = MatchPosition> + 'a {
        self.matches_key(text, fold_str(&normalize(target)))
    }

    /// Like [`matches`](Self::matches) for an already folded key
    pub fn matches_key<'a, K>(
        &'a self,
        text: &'a IndexedText,
        key: K,
    ) -> impl Iterator<Item = MatchPosition> + 'a
    where
        K: AsRef<[char]> + 'a,
    {
        let exclusions = self
            .exclusions
            .get(key.as_ref())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut from = 0;

        std::iter::from_fn(move || {
            let key = key.as_ref();
            while let Some(start) = text.find_from(key, from) {
                from = start + 1;
                if let Some(found) = accept(text, start, start + key.len()) {
                    if !is_excluded(text, &found, exclusions) {
                        return Some(found);
                    }
                }
            }
            None
        })
    }
}

/// Apply the boundary rules to a raw hit at `[start, end)`
fn accept(text: &IndexedText, start: usize, end: usize) -> Option<MatchPosition> {
    let in_quotes = text.in_quotes(start);

    if is_hyphen_compound_right(text, end) {
        return None;
    }
    if !is_right_boundary(text, end, in_quotes) {
        return None;
    }

    let prefix = match text.char_before(start) {
        None => None,
        Some(c) if is_left_delimiter(text, start, in_quotes) => {
            if c == '-' && is_hyphen_compound_left(text, start) {
                // "ה-ביבי" keeps a hyphenated prefix; any other word is a compound
                let letter = text.char_at(start - 2)?;
                if !is_hebrew_prefix(letter) || !is_left_boundary(text, start - 2, in_quotes) {
                    return None;
                }
            }
            None
        }
        Some(c) if is_hebrew_prefix(c) && is_left_boundary(text, start - 1, in_quotes) => Some(c),
        Some(_) => return None,
    };

    Some(MatchPosition {
        start,
        end,
        prefix,
        in_quotes,
    })
}

/// Left edge is the text start or a delimiter
fn is_left_boundary(text: &IndexedText, start: usize, in_quotes: bool) -> bool {
    start == 0 || is_left_delimiter(text, start, in_quotes)
}

fn is_left_delimiter(text: &IndexedText, start: usize, in_quotes: bool) -> bool {
    let Some(c) = text.char_before(start) else {
        return false;
    };
    if is_boundary_char(c) {
        return true;
    }
    if in_quotes && is_quote_char(c) {
        return true;
    }
    // An apostrophe that is not a geresh opens a single-quoted word
    c == '\'' && !text.char_before(start - 1).is_some_and(char::is_alphabetic)
}

fn is_right_boundary(text: &IndexedText, end: usize, in_quotes: bool) -> bool {
    let Some(c) = text.char_at(end) else {
        return true;
    };
    if is_boundary_char(c) {
        return true;
    }
    if in_quotes && is_quote_char(c) {
        return true;
    }
    if c == '"' || c == '\'' {
        // A closing mark (or trailing geresh) followed by a non-letter
        return !text.char_at(end + 1).is_some_and(char::is_alphabetic);
    }
    false
}

/// `name-X` with a letter after the hyphen
fn is_hyphen_compound_right(text: &IndexedText, end: usize) -> bool {
    text.char_at(end) == Some('-') && text.char_at(end + 1).is_some_and(char::is_alphabetic)
}

/// `X-name` with a letter before the hyphen
fn is_hyphen_compound_left(text: &IndexedText, start: usize) -> bool {
    start >= 2
        && text.char_at(start - 1) == Some('-')
        && text.char_at(start - 2).is_some_and(char::is_alphabetic)
}

fn is_excluded(text: &IndexedText, found: &MatchPosition, exclusions: &[CompiledExclusion]) -> bool {
    exclusions.iter().any(|rule| match rule.kind {
        ExclusionKind::PrecededBy => word_before(text, found.token_start(), &rule.word),
        ExclusionKind::FollowedBy => word_after(text, found.end, &rule.word),
    })
}

/// The token ending right before `pos` (spaces skipped) is `word`,
/// optionally carrying one prefix letter
pub(crate) fn word_before(text: &IndexedText, pos: usize, word: &[char]) -> bool {
    let chars = text.chars();
    let mut end = pos.min(chars.len());
    while end > 0 && chars[end - 1] == ' ' {
        end -= 1;
    }
    if end < word.len() || chars[end - word.len()..end] != *word {
        return false;
    }
    let start = end - word.len();
    if start == 0 || is_boundary_char(chars[start - 1]) {
        return true;
    }
    is_hebrew_prefix(chars[start - 1]) && (start == 1 || is_boundary_char(chars[start - 2]))
}

/// The token starting right after `pos` (spaces skipped) is `word`
pub(crate) fn word_after(text: &IndexedText, pos: usize, word: &[char]) -> bool {
    let chars = text.chars();
    let mut start = pos;
    while start < chars.len() && chars[start] == ' ' {
        start += 1;
    }
    let end = start + word.len();
    if end > chars.len() || chars[start..end] != *word {
        return false;
    }
    chars
        .get(end)
        .map_or(true, |&c| is_boundary_char(c) || is_quote_char(c))
}
