//! Versioned linguistic rule tables
//!
//! All word lists the matchers consult live here as data: name-collision
//! exclusions, the office-title vocabulary and the modifier lists used to
//! disqualify a title occurrence. A [`RuleSet`] can be exported to and
//! loaded from TOML so the tables can be revised without touching the
//! matching code.
//!
//! Strings are stored in normalized form (straight quotes, `-` for dashes).

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{DetectionError, LoadResult};
use super::normalize::normalize;

/// Version tag of the built-in tables
pub const DEFAULT_RULES_VERSION: &str = "v1";

/// Which neighbouring token an exclusion inspects
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionKind {
    /// Reject the match when the previous word is `word`
    PrecededBy,
    /// Reject the match when the next word is `word`
    FollowedBy,
}

/// A surface form that names someone else in a specific neighbourhood
///
/// e.g. "נתניהו" preceded by "יאיר" is the son, not the prime minister.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExclusionRule {
    /// Surface form the rule applies to (name, alias or surname)
    pub surface: String,

    /// Politician whose detection the rule protects (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub politician: Option<String>,

    /// Direction of the neighbouring token
    pub kind: ExclusionKind,

    /// The neighbouring word that flips the identity
    pub word: String,
}

impl ExclusionRule {
    pub fn preceded_by(surface: &str, politician: Option<&str>, word: &str) -> Self {
        Self {
            surface: surface.to_string(),
            politician: politician.map(str::to_string),
            kind: ExclusionKind::PrecededBy,
            word: word.to_string(),
        }
    }

    pub fn followed_by(surface: &str, politician: Option<&str>, word: &str) -> Self {
        Self {
            surface: surface.to_string(),
            politician: politician.map(str::to_string),
            kind: ExclusionKind::FollowedBy,
            word: word.to_string(),
        }
    }
}

/// One office-title surface form and the standardized title it stands for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionTitle {
    /// Form as it appears in text ("רה\"מ", "שר הבטחון")
    pub surface: String,

    /// Standardized title looked up in roster `position` fields
    pub title: String,
}

impl PositionTitle {
    fn new(surface: &str, title: &str) -> Self {
        Self {
            surface: surface.to_string(),
            title: title.to_string(),
        }
    }
}

/// Complete set of linguistic tables used by a detection run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSet {
    /// Version label, carried into logs
    pub version: String,

    /// Words following a title that mark a past holder ("לשעבר", "דאז")
    #[serde(default)]
    pub former_markers: Vec<String>,

    /// Words following a title that mark a future holder ("הבא", "הנכנס")
    #[serde(default)]
    pub future_markers: Vec<String>,

    /// Words shortly before a title that mark a candidacy ("מועמד")
    #[serde(default)]
    pub candidate_markers: Vec<String>,

    /// Phrases shortly before a title that make it hypothetical ("מי שיהיה")
    #[serde(default)]
    pub hypothetical_markers: Vec<String>,

    /// Words directly before a title that name a different office ("סגן")
    #[serde(default)]
    pub deputy_markers: Vec<String>,

    /// Words following a title that name a different office ("החלופי")
    #[serde(default)]
    pub alternate_markers: Vec<String>,

    /// Words following a title that attach it to someone else ("של")
    #[serde(default)]
    pub possessive_markers: Vec<String>,

    /// Owners after a possessive marker that still mean the local office
    #[serde(default)]
    pub domestic_possessives: Vec<String>,

    /// Country and nationality names that redirect a title abroad
    #[serde(default)]
    pub foreign_indicators: Vec<String>,

    /// Verbs that attribute quoted speech ("אמר", "הוסיפה")
    #[serde(default)]
    pub speech_verbs: Vec<String>,

    /// Neighbour-based identity exclusions
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,

    /// Office-title vocabulary
    #[serde(default)]
    pub position_titles: Vec<PositionTitle>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl RuleSet {
    /// Built-in Hebrew tables
    pub fn builtin() -> Self {
        Self {
            version: DEFAULT_RULES_VERSION.to_string(),
            former_markers: words(&[
                "לשעבר", "היוצא", "היוצאת", "הקודם", "הקודמת", "דאז", "שכיהן", "שכיהנה",
                "אשר כיהן", "אשר כיהנה", "בעבר", "המנוח", "המנוחה", "ז\"ל",
            ]),
            future_markers: words(&[
                "הבא", "הבאה", "הנכנס", "הנכנסת", "הנבחר", "הנבחרת", "העתידי", "העתידית",
                "המיועד", "המיועדת",
            ]),
            candidate_markers: words(&[
                "מועמד", "מועמדת", "המועמד", "המועמדת", "מועמדות", "יתמודד", "תתמודד",
                "להתמודד", "לרוץ",
            ]),
            hypothetical_markers: words(&[
                "מי שיהיה", "מי שתהיה", "מי שיכהן", "מי שתכהן", "מי שייבחר", "מי שיבחר",
                "אילו", "לו היה", "לו הייתי", "אם יהיה", "אם אהיה", "כשיהיה", "כשאהיה",
                "כאשר יהיה",
            ]),
            deputy_markers: words(&[
                "סגן", "סגנית", "ממלא מקום", "ממלאת מקום", "מ\"מ",
            ]),
            alternate_markers: words(&["החלופי", "החלופית", "החליפי"]),
            possessive_markers: words(&["של"]),
            domestic_possessives: words(&["ישראל", "מדינת ישראל", "המדינה"]),
            foreign_indicators: words(&[
                "ארה\"ב", "ארצות הברית", "אמריקה", "האמריקאי", "האמריקאית", "האמריקני",
                "בריטניה", "הבריטי", "הבריטית", "אנגליה", "צרפת", "הצרפתי", "הצרפתית",
                "גרמניה", "הגרמני", "הגרמנית", "רוסיה", "הרוסי", "הרוסית", "אוקראינה",
                "האוקראיני", "האוקראינית", "איראן", "האיראני", "האיראנית", "טורקיה",
                "הטורקי", "הטורקית", "מצרים", "המצרי", "המצרית", "ירדן", "הירדני",
                "הירדנית", "לבנון", "הלבנוני", "הלבנונית", "סוריה", "הסורי", "הסורית",
                "סין", "הסיני", "הסינית", "הודו", "ההודי", "ההודית", "יפן", "היפני",
                "היפנית", "קנדה", "הקנדי", "הקנדית", "איטליה", "האיטלקי", "האיטלקית",
                "ספרד", "הספרדי", "הספרדית", "הונגריה", "ההונגרי", "ההונגרית", "יוון",
                "היווני", "היוונית", "הפלסטיני", "הפלסטינית", "הרשות הפלסטינית", "קטאר",
                "הקטארי", "הקטארית", "סעודיה", "הסעודי", "הסעודית", "האמירויות", "הולנד",
                "ההולנדי", "ההולנדית", "פולין", "הפולני", "הפולנית", "אוסטרליה",
                "האוסטרלי", "האוסטרלית", "ארגנטינה", "הארגנטינאי",
            ]),
            speech_verbs: words(&[
                "אמר", "אמרה", "הוסיף", "הוסיפה", "הצהיר", "הצהירה", "כתב", "כתבה", "טען",
                "טענה", "מסר", "מסרה", "הגיב", "הגיבה", "ציין", "ציינה",
            ]),
            exclusions: vec![
                ExclusionRule::preceded_by("נתניהו", Some("בנימין נתניהו"), "יאיר"),
                ExclusionRule::preceded_by("נתניהו", Some("בנימין נתניהו"), "שרה"),
                ExclusionRule::preceded_by("נתניהו", Some("בנימין נתניהו"), "אבנר"),
                ExclusionRule::preceded_by("נתניהו", Some("בנימין נתניהו"), "עידו"),
                ExclusionRule::preceded_by("לפיד", Some("יאיר לפיד"), "טומי"),
                ExclusionRule::preceded_by("לפיד", Some("יאיר לפיד"), "שולמית"),
                ExclusionRule::preceded_by("ברק", Some("אהוד ברק"), "אהרון"),
                ExclusionRule::followed_by("ברק", Some("אהוד ברק"), "רביד"),
                ExclusionRule::followed_by("ברק", Some("אהוד ברק"), "סרי"),
                ExclusionRule::preceded_by("כץ", Some("ישראל כץ"), "חיים"),
                ExclusionRule::preceded_by("כץ", Some("ישראל כץ"), "יעקב"),
                ExclusionRule::preceded_by("גולן", Some("יאיר גולן"), "רמת"),
            ],
            position_titles: vec![
                PositionTitle::new("ראש הממשלה", "ראש הממשלה"),
                PositionTitle::new("רה\"מ", "ראש הממשלה"),
                PositionTitle::new("ראש ממשלת ישראל", "ראש הממשלה"),
                PositionTitle::new("שר הביטחון", "שר הביטחון"),
                PositionTitle::new("שר הבטחון", "שר הביטחון"),
                PositionTitle::new("שר האוצר", "שר האוצר"),
                PositionTitle::new("שר החוץ", "שר החוץ"),
                PositionTitle::new("שר המשפטים", "שר המשפטים"),
                PositionTitle::new("שר הפנים", "שר הפנים"),
                PositionTitle::new("שר החינוך", "שר החינוך"),
                PositionTitle::new("שר הבריאות", "שר הבריאות"),
                PositionTitle::new("שר התחבורה", "שר התחבורה"),
                PositionTitle::new("שרת התחבורה", "שרת התחבורה"),
                PositionTitle::new("השר לביטחון לאומי", "השר לביטחון לאומי"),
                PositionTitle::new("השר לבטחון לאומי", "השר לביטחון לאומי"),
                PositionTitle::new("שר הביטחון הלאומי", "השר לביטחון לאומי"),
                PositionTitle::new("נשיא המדינה", "נשיא המדינה"),
                PositionTitle::new("יושב ראש הכנסת", "יושב ראש הכנסת"),
                PositionTitle::new("יו\"ר הכנסת", "יושב ראש הכנסת"),
                PositionTitle::new("ראש האופוזיציה", "ראש האופוזיציה"),
                PositionTitle::new("יו\"ר האופוזיציה", "ראש האופוזיציה"),
            ],
        }
    }

    /// An empty table set (no exclusions, no titles)
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            former_markers: Vec::new(),
            future_markers: Vec::new(),
            candidate_markers: Vec::new(),
            hypothetical_markers: Vec::new(),
            deputy_markers: Vec::new(),
            alternate_markers: Vec::new(),
            possessive_markers: Vec::new(),
            domestic_possessives: Vec::new(),
            foreign_indicators: Vec::new(),
            speech_verbs: Vec::new(),
            exclusions: Vec::new(),
            position_titles: Vec::new(),
        }
    }

    /// Parse a rule set from TOML, normalizing every entry
    pub fn from_toml_str(content: &str) -> LoadResult<Self> {
        let rules: Self = toml::from_str(content)
            .map_err(|e| DetectionError::rules_parse_failed(e.to_string()))?;
        Ok(rules.normalized())
    }

    /// Load a rule set from a TOML file
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DetectionError::io_error("read rules", Some(path.to_path_buf()), e))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> LoadResult<String> {
        toml::to_string_pretty(self).map_err(|e| DetectionError::rules_parse_failed(e.to_string()))
    }

    /// Run every entry through the text normalizer
    fn normalized(mut self) -> Self {
        for list in [
            &mut self.former_markers,
            &mut self.future_markers,
            &mut self.candidate_markers,
            &mut self.hypothetical_markers,
            &mut self.deputy_markers,
            &mut self.alternate_markers,
            &mut self.possessive_markers,
            &mut self.domestic_possessives,
            &mut self.foreign_indicators,
            &mut self.speech_verbs,
        ] {
            for word in list.iter_mut() {
                *word = normalize(word);
            }
            list.retain(|w| !w.is_empty());
        }
        for rule in &mut self.exclusions {
            rule.surface = normalize(&rule.surface);
            rule.word = normalize(&rule.word);
        }
        self.exclusions
            .retain(|r| !r.surface.is_empty() && !r.word.is_empty());
        for title in &mut self.position_titles {
            title.surface = normalize(&title.surface);
            title.title = normalize(&title.title);
        }
        self.position_titles
            .retain(|t| !t.surface.is_empty() && !t.title.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_version() {
        let rules = RuleSet::default();
        assert_eq!(rules.version, DEFAULT_RULES_VERSION);
        assert!(!rules.position_titles.is_empty());
        assert!(rules.former_markers.contains(&"לשעבר".to_string()));
    }

    #[test]
    fn test_toml_roundtrip_builtin() {
        let rules = RuleSet::builtin();
        let toml = rules.to_toml_string().unwrap();
        let parsed = RuleSet::from_toml_str(&toml).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn test_from_toml_partial_and_normalized() {
        let content = r#"
version = "test-2"
former_markers = ["  לשעבר "]

[[exclusions]]
surface = "ברק"
kind = "followed_by"
word = "רביד"

[[position_titles]]
surface = "ראש־הממשלה"
title = "ראש הממשלה"
"#;
        let rules = RuleSet::from_toml_str(content).unwrap();
        assert_eq!(rules.version, "test-2");
        assert_eq!(rules.former_markers, vec!["לשעבר".to_string()]);
        assert_eq!(rules.exclusions[0].kind, ExclusionKind::FollowedBy);
        assert_eq!(rules.exclusions[0].politician, None);
        assert_eq!(rules.position_titles[0].surface, "ראש-הממשלה");
        assert!(rules.future_markers.is_empty());
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = RuleSet::from_toml_str("version = [").unwrap_err();
        assert!(matches!(err, DetectionError::RulesParseFailed { .. }));
    }
}
