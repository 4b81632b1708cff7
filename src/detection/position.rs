//! Office-title resolution
//!
//! Infers a politician from a government title in the text ("ראש הממשלה"
//! → the current prime minister). Each title occurrence is first checked
//! for modifiers that point at someone other than the sitting holder:
//!
//! | Modifier      | Where it is looked for                         |
//! |---------------|------------------------------------------------|
//! | former        | first tokens after the title                   |
//! | future        | token right after the title                    |
//! | alternate     | token right after the title                    |
//! | possessive    | "של" after the title, unless "של ישראל"         |
//! | deputy/acting | word right before the title                    |
//! | candidate     | window before the title                        |
//! | hypothetical  | window before the title                        |
//! | foreign       | anywhere in the window around the title        |
//!
//! Surviving occurrences resolve to the roster entry whose `position`
//! equals the standardized title, falling back to one that contains it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::boundary::{is_boundary_char, word_after, word_before, BoundaryMatcher, MatchPosition};
use super::normalize::normalize;
use super::roster::{Roster, RosterEntry};
use super::rules::RuleSet;
use super::text::{fold_str, IndexedText};

/// Default radius in chars inspected around a title
pub const DEFAULT_POSITION_WINDOW: usize = 30;

/// Default radius for optional name corroboration
pub const DEFAULT_CORROBORATION_WINDOW: usize = 150;

/// Former markers are accepted this many tokens after the title
/// ("ראש הממשלה נפתלי בנט לשעבר")
const FORMER_MARKER_TOKENS: usize = 3;

/// Which roster entry wins when several hold the same title
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First matching entry in roster order
    #[default]
    RosterOrder,
    /// Latest `positionSince`, entries without a date last
    MostRecentlyConfirmed,
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "roster_order" => Ok(TieBreak::RosterOrder),
            "most_recently_confirmed" => Ok(TieBreak::MostRecentlyConfirmed),
            other => Err(format!("unknown tie-break policy: {other}")),
        }
    }
}

/// Why a title occurrence was not attributed to the sitting holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disqualifier {
    Former,
    Future,
    Alternate,
    Possessive,
    Deputy,
    Candidate,
    Hypothetical,
    Foreign,
}

/// Tunables for [`PositionResolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub window: usize,
    pub tie_break: TieBreak,
    pub require_corroboration: bool,
    pub corroboration_window: usize,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_POSITION_WINDOW,
            tie_break: TieBreak::default(),
            require_corroboration: false,
            corroboration_window: DEFAULT_CORROBORATION_WINDOW,
        }
    }
}

/// A title occurrence attributed to a roster politician
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMatch {
    /// Canonical name of the holder
    pub politician: String,

    /// Standardized title
    pub title: String,

    /// Surface form found in the text
    pub surface: String,

    pub position: MatchPosition,
}

#[derive(Debug, Clone)]
struct CompiledTitle {
    surface: String,
    title: String,
    title_key: Vec<char>,
}

type Keys = Vec<Vec<char>>;

fn compile(list: &[String]) -> Keys {
    list.iter()
        .map(|w| fold_str(&normalize(w)))
        .filter(|k| !k.is_empty())
        .collect()
}

/// Marker spans found once per text
#[derive(Debug, Default)]
struct MarkerSpans {
    candidate: Vec<MatchPosition>,
    hypothetical: Vec<MatchPosition>,
    foreign: Vec<MatchPosition>,
}

/// Resolves office titles to their current holders
#[derive(Debug, Clone)]
pub struct PositionResolver {
    titles: Vec<CompiledTitle>,
    former: Keys,
    future: Keys,
    alternate: Keys,
    possessive: Keys,
    domestic: Keys,
    deputy: Keys,
    candidate: Keys,
    hypothetical: Keys,
    foreign: Keys,
    matcher: BoundaryMatcher,
    options: PositionOptions,
}

impl PositionResolver {
    pub fn new(rules: &RuleSet, options: PositionOptions) -> Self {
        let titles = rules
            .position_titles
            .iter()
            .map(|t| {
                let title = normalize(&t.title);
                CompiledTitle {
                    surface: normalize(&t.surface),
                    title_key: fold_str(&title),
                    title,
                }
            })
            .filter(|t| !t.surface.is_empty() && !t.title_key.is_empty())
            .collect();

        Self {
            titles,
            former: compile(&rules.former_markers),
            future: compile(&rules.future_markers),
            alternate: compile(&rules.alternate_markers),
            possessive: compile(&rules.possessive_markers),
            domestic: compile(&rules.domestic_possessives),
            deputy: compile(&rules.deputy_markers),
            candidate: compile(&rules.candidate_markers),
            hypothetical: compile(&rules.hypothetical_markers),
            foreign: compile(&rules.foreign_indicators),
            matcher: BoundaryMatcher::plain(),
            options,
        }
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Names of politicians referenced by title in `text`, first-seen order
    pub fn resolve_by_position(&self, text: &IndexedText, roster: &Roster) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for m in self.find_position_matches(text, roster) {
            if !names.contains(&m.politician) {
                names.push(m.politician);
            }
        }
        names
    }

    /// Every title occurrence that resolves to a current holder
    pub fn find_position_matches(&self, text: &IndexedText, roster: &Roster) -> Vec<PositionMatch> {
        if text.is_empty() || roster.is_empty() || self.titles.is_empty() {
            return Vec::new();
        }

        let occurrences = self.title_occurrences(text);
        if occurrences.is_empty() {
            return Vec::new();
        }

        let markers = MarkerSpans {
            candidate: self.spans(text, &self.candidate),
            hypothetical: self.spans(text, &self.hypothetical),
            foreign: self.spans(text, &self.foreign),
        };

        let mut holders: HashMap<usize, Option<usize>> = HashMap::new();
        let mut matches = Vec::new();

        for (title_idx, pos) in occurrences {
            let title = &self.titles[title_idx];

            if let Some(reason) = self.disqualifier(text, &pos, &markers) {
                tracing::debug!(
                    title = %title.title,
                    offset = pos.start,
                    reason = ?reason,
                    "Title occurrence disqualified"
                );
                continue;
            }

            let holder = *holders
                .entry(title_idx)
                .or_insert_with(|| self.holder_index(roster, &title.title_key));
            let Some(entry) = holder.and_then(|i| roster.entries().get(i)) else {
                continue;
            };

            if self.options.require_corroboration && !self.is_corroborated(text, &pos, entry) {
                tracing::debug!(
                    title = %title.title,
                    politician = %entry.name(),
                    "Title not corroborated by a name nearby"
                );
                continue;
            }

            matches.push(PositionMatch {
                politician: entry.name().to_string(),
                title: title.title.clone(),
                surface: title.surface.clone(),
                position: pos,
            });
        }

        matches
    }

    /// Current holder of a standardized title
    pub fn holder<'r>(&self, roster: &'r Roster, title: &str) -> Option<&'r RosterEntry> {
        let key = fold_str(&normalize(title));
        self.holder_index(roster, &key)
            .and_then(|i| roster.entries().get(i))
    }

    /// Boundary-matched title occurrences; overlapping hits keep the longest
    fn title_occurrences(&self, text: &IndexedText) -> Vec<(usize, MatchPosition)> {
        let mut found: Vec<(usize, MatchPosition)> = self
            .titles
            .iter()
            .enumerate()
            .flat_map(|(i, t)| {
                self.matcher
                    .matches(text, &t.surface)
                    .map(move |m| (i, m))
            })
            .collect();

        found.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.1.start.cmp(&b.1.start)));

        let mut kept: Vec<(usize, MatchPosition)> = Vec::with_capacity(found.len());
        for (i, m) in found {
            if !kept.iter().any(|(_, k)| k.overlaps(&m)) {
                kept.push((i, m));
            }
        }
        kept.sort_by_key(|(_, m)| m.start);
        kept
    }

    fn spans(&self, text: &IndexedText, keys: &Keys) -> Vec<MatchPosition> {
        let mut spans: Vec<MatchPosition> = keys
            .iter()
            .flat_map(|k| self.matcher.matches_key(text, k.as_slice()))
            .collect();
        spans.sort_by_key(|m| m.start);
        spans
    }

    fn disqualifier(
        &self,
        text: &IndexedText,
        pos: &MatchPosition,
        markers: &MarkerSpans,
    ) -> Option<Disqualifier> {
        let window = self.options.window;
        let token_start = pos.token_start();
        let window_start = token_start.saturating_sub(window);
        let window_end = pos.end.saturating_add(window);
        let following = following_tokens(text, pos.end, window_end, FORMER_MARKER_TOKENS);

        if following
            .iter()
            .any(|&t| starts_with_any(text, t, &self.former))
        {
            return Some(Disqualifier::Former);
        }

        if let Some(&first) = following.first() {
            if starts_with_any(text, first, &self.future) {
                return Some(Disqualifier::Future);
            }
            if starts_with_any(text, first, &self.alternate) {
                return Some(Disqualifier::Alternate);
            }
            if let Some(marker) = self.possessive.iter().find(|k| word_at(text, first, k)) {
                let owner_domestic = self
                    .domestic
                    .iter()
                    .any(|d| word_after(text, first + marker.len(), d));
                if !owner_domestic {
                    return Some(Disqualifier::Possessive);
                }
            }
        }

        if self
            .deputy
            .iter()
            .any(|d| word_before(text, token_start, d))
        {
            return Some(Disqualifier::Deputy);
        }

        let before = |spans: &[MatchPosition]| {
            spans
                .iter()
                .any(|m| m.token_start() >= window_start && m.end <= token_start)
        };
        if before(&markers.candidate) {
            return Some(Disqualifier::Candidate);
        }
        if before(&markers.hypothetical) {
            return Some(Disqualifier::Hypothetical);
        }

        if markers
            .foreign
            .iter()
            .any(|m| m.start < window_end && m.end > window_start && !pos.contains(m))
        {
            return Some(Disqualifier::Foreign);
        }

        None
    }

    /// Index of the holder of `title_key` under the tie-break policy
    fn holder_index(&self, roster: &Roster, title_key: &[char]) -> Option<usize> {
        let mut exact: Vec<usize> = Vec::new();
        let mut containing: Vec<usize> = Vec::new();

        for (i, entry) in roster.entries().iter().enumerate() {
            if entry.position().is_empty() {
                continue;
            }
            let position = fold_str(entry.position());
            if position == title_key {
                exact.push(i);
            } else if contains_slice(&position, title_key) && !self.names_other_office(&position) {
                containing.push(i);
            }
        }

        let pick = |candidates: Vec<usize>| -> Option<usize> {
            match self.options.tie_break {
                TieBreak::RosterOrder => candidates.first().copied(),
                TieBreak::MostRecentlyConfirmed => {
                    let entries = roster.entries();
                    let mut best: Option<usize> = None;
                    for i in candidates {
                        let since = entries[i].record().position_since;
                        let better = match best {
                            None => true,
                            Some(b) => since > entries[b].record().position_since,
                        };
                        if better {
                            best = Some(i);
                        }
                    }
                    best
                }
            }
        };

        if exact.len() > 1 || (exact.is_empty() && containing.len() > 1) {
            tracing::debug!(
                title = %title_key.iter().collect::<String>(),
                policy = ?self.options.tie_break,
                "Several roster entries hold the same title"
            );
        }

        pick(exact).or_else(|| pick(containing))
    }

    /// A roster position like "סגן שר הביטחון" or "ראש הממשלה החלופי" holds
    /// a different office
    fn names_other_office(&self, position: &[char]) -> bool {
        self.deputy
            .iter()
            .chain(&self.alternate)
            .any(|marker| contains_slice(position, marker))
    }

    fn is_corroborated(&self, text: &IndexedText, pos: &MatchPosition, entry: &RosterEntry) -> bool {
        let radius = self.options.corroboration_window;
        let start = pos.token_start().saturating_sub(radius);
        let end = pos.end.saturating_add(radius);

        entry
            .surname()
            .into_iter()
            .chain(entry.aliases().iter().map(String::as_str))
            .any(|indicator| {
                self.matcher
                    .matches(text, indicator)
                    .any(|m| m.token_start() >= start && m.end <= end)
            })
    }
}

fn contains_slice(haystack: &[char], needle: &[char]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Start offsets of up to `limit` tokens after `from`, stopping at sentence
/// punctuation or `until`
fn following_tokens(text: &IndexedText, from: usize, until: usize, limit: usize) -> Vec<usize> {
    let chars = text.chars();
    let until = until.min(chars.len());
    let mut starts = Vec::with_capacity(limit);
    let mut i = from;

    while i < until && starts.len() < limit {
        let c = chars[i];
        if matches!(c, '.' | '!' | '?' | ':' | ';' | '"') {
            break;
        }
        if is_boundary_char(c) || c == '\'' {
            i += 1;
            continue;
        }
        starts.push(i);
        while i < chars.len() && !is_boundary_char(chars[i]) && chars[i] != '"' {
            i += 1;
        }
    }
    starts
}

/// `word` sits at `pos` and ends on a boundary
fn word_at(text: &IndexedText, pos: usize, word: &[char]) -> bool {
    word_after(text, pos, word)
}

fn starts_with_any(text: &IndexedText, pos: usize, keys: &Keys) -> bool {
    keys.iter().any(|k| word_at(text, pos, k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::roster::PoliticianRecord;
    use chrono::NaiveDate;

    fn roster() -> Roster {
        Roster::new(vec![
            PoliticianRecord::new("בנימין נתניהו")
                .with_aliases(&["ביבי"])
                .with_position("ראש הממשלה"),
            PoliticianRecord::new("ישראל כץ").with_position("שר הביטחון"),
            PoliticianRecord::new("איתמר בן גביר").with_position("השר לביטחון לאומי"),
            PoliticianRecord::new("יצחק הרצוג").with_position("נשיא המדינה"),
            PoliticianRecord::new("בצלאל סמוטריץ'").with_position("שר האוצר, שר במשרד הביטחון"),
        ])
    }

    fn resolve(text: &str) -> Vec<String> {
        let resolver = PositionResolver::new(&RuleSet::builtin(), PositionOptions::default());
        resolver.resolve_by_position(&IndexedText::new(Some(text)), &roster())
    }

    #[test]
    fn test_plain_title() {
        assert_eq!(resolve("ראש הממשלה הודיע היום"), vec!["בנימין נתניהו"]);
        assert_eq!(resolve("לדברי רה\"מ, המצב יציב"), vec!["בנימין נתניהו"]);
        assert_eq!(resolve("נפגש עם נשיא המדינה"), vec!["יצחק הרצוג"]);
    }

    #[test]
    fn test_prefixed_title() {
        assert_eq!(resolve("מקורבים לראש הממשלה אמרו"), vec!["בנימין נתניהו"]);
    }

    #[test]
    fn test_former_and_future() {
        assert!(resolve("ראש הממשלה לשעבר נפתלי בנט אמר").is_empty());
        assert!(resolve("ראש הממשלה נפתלי בנט לשעבר אמר").is_empty());
        assert!(resolve("ראש הממשלה דאז").is_empty());
        assert!(resolve("ראש הממשלה הבא יצטרך").is_empty());
    }

    #[test]
    fn test_deputy_and_candidate() {
        assert!(resolve("סגן שר הביטחון ביקר").is_empty());
        assert!(resolve("המועמד לתפקיד ראש הממשלה").is_empty());
        assert!(resolve("מי שיהיה ראש הממשלה").is_empty());
    }

    #[test]
    fn test_possessive() {
        assert!(resolve("ראש הממשלה של הונגריה").is_empty());
        assert!(resolve("ראש הממשלה של פולין").is_empty());
        assert_eq!(resolve("ראש הממשלה של ישראל נאם"), vec!["בנימין נתניהו"]);
    }

    #[test]
    fn test_foreign() {
        assert!(resolve("ראש הממשלה הבריטי הגיע").is_empty());
        assert!(resolve("בביקור בצרפת אמר ראש הממשלה").is_empty());
    }

    #[test]
    fn test_longest_title_wins() {
        assert_eq!(resolve("שר הביטחון הלאומי אמר"), vec!["איתמר בן גביר"]);
        assert_eq!(resolve("שר הביטחון אמר"), vec!["ישראל כץ"]);
    }

    #[test]
    fn test_exact_before_containment() {
        let resolver = PositionResolver::new(&RuleSet::builtin(), PositionOptions::default());
        let roster = roster();
        assert_eq!(resolver.holder(&roster, "שר הביטחון").unwrap().name(), "ישראל כץ");
        assert_eq!(resolver.holder(&roster, "שר האוצר").unwrap().name(), "בצלאל סמוטריץ'");
        assert!(resolver.holder(&roster, "שר החינוך").is_none());
    }

    #[test]
    fn test_containment_skips_deputy_and_alternate() {
        let resolver = PositionResolver::new(&RuleSet::builtin(), PositionOptions::default());
        let roster = Roster::new(vec![
            PoliticianRecord::new("בני גנץ").with_position("ראש הממשלה החלופי"),
            PoliticianRecord::new("אריה דרעי").with_position("סגן ראש הממשלה"),
            PoliticianRecord::new("יריב לוין").with_position("ראש הממשלה ושר המשפטים"),
        ]);
        assert_eq!(resolver.holder(&roster, "ראש הממשלה").unwrap().name(), "יריב לוין");

        let alternate_only = Roster::new(vec![
            PoliticianRecord::new("בני גנץ").with_position("ראש הממשלה החלופי"),
        ]);
        assert!(resolver.holder(&alternate_only, "ראש הממשלה").is_none());
    }

    #[test]
    fn test_tie_break_policies() {
        let roster = Roster::new(vec![
            PoliticianRecord::new("יולי אדלשטיין")
                .with_position("יושב ראש הכנסת")
                .with_position_since(NaiveDate::from_ymd_opt(2013, 3, 18).unwrap()),
            PoliticianRecord::new("אמיר אוחנה")
                .with_position("יושב ראש הכנסת")
                .with_position_since(NaiveDate::from_ymd_opt(2022, 12, 29).unwrap()),
        ]);
        let text = IndexedText::new(Some("יו\"ר הכנסת פתח את הישיבה"));

        let by_order = PositionResolver::new(&RuleSet::builtin(), PositionOptions::default());
        assert_eq!(by_order.resolve_by_position(&text, &roster), vec!["יולי אדלשטיין"]);

        let by_date = PositionResolver::new(
            &RuleSet::builtin(),
            PositionOptions {
                tie_break: TieBreak::MostRecentlyConfirmed,
                ..Default::default()
            },
        );
        assert_eq!(by_date.resolve_by_position(&text, &roster), vec!["אמיר אוחנה"]);
    }

    #[test]
    fn test_corroboration() {
        let resolver = PositionResolver::new(
            &RuleSet::builtin(),
            PositionOptions {
                require_corroboration: true,
                ..Default::default()
            },
        );
        let roster = roster();
        let bare = IndexedText::new(Some("ראש הממשלה הודיע"));
        assert!(resolver.resolve_by_position(&bare, &roster).is_empty());
        let named = IndexedText::new(Some("ראש הממשלה נתניהו הודיע"));
        assert_eq!(resolver.resolve_by_position(&named, &roster), vec!["בנימין נתניהו"]);
        let nick = IndexedText::new(Some("ראש הממשלה הודיע. ביבי הוסיף"));
        assert_eq!(resolver.resolve_by_position(&nick, &roster), vec!["בנימין נתניהו"]);
    }

    #[test]
    fn test_tie_break_from_str() {
        assert_eq!("roster-order".parse::<TieBreak>().unwrap(), TieBreak::RosterOrder);
        assert_eq!(
            "most_recently_confirmed".parse::<TieBreak>().unwrap(),
            TieBreak::MostRecentlyConfirmed
        );
        assert!("newest".parse::<TieBreak>().is_err());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(resolve("").is_empty());
        let resolver = PositionResolver::new(&RuleSet::builtin(), PositionOptions::default());
        let text = IndexedText::new(Some("ראש הממשלה"));
        assert!(resolver.resolve_by_position(&text, &Roster::default()).is_empty());
    }
}
