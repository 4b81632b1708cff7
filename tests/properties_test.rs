//! Property tests for normalization and matching

use proptest::prelude::*;

use mivzak::detection::{normalize, normalize_text, MentionDetector, PoliticianRecord, Roster};

const FILLER: [&str; 10] = [
    "הכנסת", "היום", "דיון", "תקציב", "הצבעה", "בוקר", "העיר", "חדשות", "מליאה", "ועדה",
];

fn roster() -> Roster {
    Roster::new(vec![
        PoliticianRecord::new("בנימין נתניהו").with_aliases(&["ביבי"]),
        PoliticianRecord::new("יאיר לפיד").with_aliases(&["לפיד"]),
    ])
}

fn sentence() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(&FILLER[..]), 0..12)
}

proptest! {
    #[test]
    fn test_normalize_idempotent(s in "\\PC*") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_normalize_idempotent_mixed(s in "[ \\t\\n\u{05D0}-\u{05EA}\u{05B0}-\u{05C7}\u{201C}\u{201D}\u{2013}\u{200F}a-z\"'-]{0,64}") {
        let once = normalize_text(Some(&s));
        prop_assert_eq!(normalize_text(Some(&once)), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
        prop_assert!(!once.contains("  "));
    }

    #[test]
    fn test_embedded_name_detected(words in sentence(), at in 0usize..12, pick in 0usize..2) {
        let roster = roster();
        let name = roster.entries()[pick].name().to_string();
        let mut words: Vec<&str> = words;
        let at = at.min(words.len());
        words.insert(at, &name);
        let text = words.join(" ");

        let found = MentionDetector::default().find_mentions(Some(&text), &roster);
        prop_assert!(found.contains(&name), "{} not found in {}", name, text);
        prop_assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_hyphen_suffix_never_matches(words in sentence(), suffix in "[\u{05D0}-\u{05EA}]{1,6}") {
        let mut text = words.join(" ");
        text.push_str(" לפיד-");
        text.push_str(&suffix);

        let found = MentionDetector::default().find_mentions(Some(&text), &roster());
        prop_assert!(found.is_empty(), "matched in {}", text);
    }
}
