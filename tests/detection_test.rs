//! End-to-end detection tests against the fixture roster

mod common;

use common::{article, detector, fixture_path, fixture_roster};
use mivzak::detection::{
    DetectionConfig, DetectionMethod, MentionDetector, PoliticianRecord, Roster, RuleSet,
};

#[test]
fn test_fixture_roster_skips_bad_entries() {
    let roster = fixture_roster();
    assert_eq!(roster.len(), 7);
    assert!(roster.get("רשומה פגומה").is_none());

    let bibi = roster.get("בנימין נתניהו").unwrap();
    assert_eq!(bibi.position(), "ראש הממשלה");
    assert!(bibi.record().position_since.is_some());
    assert!(roster.get("ישראל כץ").unwrap().requires_context());
}

#[test]
fn test_null_fields_keep_politician() {
    let roster = fixture_roster();
    let gantz = roster.get("בני גנץ").unwrap();
    assert!(gantz.aliases().is_empty());
    assert_eq!(gantz.position(), "");
    assert_eq!(detector().find_mentions(Some("בני גנץ אמר"), &roster), vec!["בני גנץ"]);
}

#[test]
fn test_missing_roster_degrades_to_empty() {
    let roster = Roster::load_or_empty(&fixture_path("does-not-exist.json"));
    assert!(roster.is_empty());
    assert!(detector()
        .find_mentions(Some("ביבי אמר אתמול"), &roster)
        .is_empty());
}

#[test]
fn test_scenario_title_and_name() {
    let found = detector().find_mentions(Some("ראש הממשלה בנימין נתניהו הודיע היום"), &fixture_roster());
    assert_eq!(found, vec!["בנימין נתניהו"]);
}

#[test]
fn test_scenario_alias_only() {
    let found = detector().find_mentions(Some("ביבי אמר אתמול"), &fixture_roster());
    assert_eq!(found, vec!["בנימין נתניהו"]);
}

#[test]
fn test_scenario_former_title() {
    let found = detector().find_mentions(Some("ראש הממשלה לשעבר נפתלי בנט אמר..."), &fixture_roster());
    assert_eq!(found, vec!["נפתלי בנט"]);
}

#[test]
fn test_scenario_empty_input() {
    let roster = fixture_roster();
    assert!(detector().find_mentions(Some(""), &roster).is_empty());
    assert!(detector().find_mentions(None, &roster).is_empty());
    assert!(detector().find_mentions(Some("   \n\t "), &roster).is_empty());
}

#[test]
fn test_name_and_alias_deduplicated() {
    let found = detector().find_mentions(
        Some("בנימין נתניהו, שמכונה ביבי, אמר כי נתניהו לא יתפטר"),
        &fixture_roster(),
    );
    assert_eq!(found, vec!["בנימין נתניהו"]);
}

#[test]
fn test_prefixed_mentions() {
    let roster = fixture_roster();
    assert_eq!(
        detector().find_mentions(Some("הפגישה עם לפיד הסתיימה"), &roster),
        vec!["יאיר לפיד"]
    );
    assert_eq!(
        detector().find_mentions(Some("ולפיד השיב בחריפות"), &roster),
        vec!["יאיר לפיד"]
    );
}

#[test]
fn test_hyphenated_compound_rejected() {
    let found = detector().find_mentions(Some("יאיר לפיד-כהן נאם בכנס"), &fixture_roster());
    assert!(found.is_empty());
}

#[test]
fn test_maqaf_spelling_matches_spaced_name() {
    let roster = Roster::new(vec![
        PoliticianRecord::new("איתמר בן גביר").with_aliases(&["בן גביר"])
    ]);
    assert_eq!(
        detector().find_mentions(Some("השר בן\u{05BE}גביר תקף"), &roster),
        vec!["איתמר בן גביר"]
    );
    assert_eq!(
        detector().find_mentions(Some("איתמר בן-גביר הודיע"), &roster),
        vec!["איתמר בן גביר"]
    );
}

#[test]
fn test_context_gating() {
    let roster = fixture_roster();
    assert!(detector()
        .find_mentions(Some("משפחת כץ פתחה מסעדה חדשה"), &roster)
        .is_empty());
    assert_eq!(
        detector().find_mentions(Some("השר כץ הגיב להחלטה"), &roster),
        vec!["ישראל כץ"]
    );
}

#[test]
fn test_position_only_resolution() {
    let found = detector().find_mentions(Some("שר האוצר הודיע על קיצוץ"), &fixture_roster());
    assert_eq!(found, vec!["בצלאל סמוטריץ'"]);
}

#[test]
fn test_disqualified_titles() {
    let roster = fixture_roster();
    for text in [
        "ראש הממשלה הבא ייבחר בקרוב",
        "ראש הממשלה הבריטי נפגש עם עמיתיו",
        "סגן ראש הממשלה ביקר בצפון",
        "מי שיהיה ראש הממשלה יצטרך להחליט",
    ] {
        assert!(detector().find_mentions(Some(text), &roster).is_empty(), "{text}");
    }
}

#[test]
fn test_exclusion_table() {
    let found = detector().find_mentions(Some("יאיר נתניהו צייץ הבוקר"), &fixture_roster());
    assert!(found.is_empty());
}

#[test]
fn test_synthetic_roster_empty_rules() {
    let roster = Roster::new(vec![PoliticianRecord::new("דנה כהן").with_position("ראש הממשלה")]);
    let detector = MentionDetector::new(&RuleSet::empty("test"), &DetectionConfig::default());
    assert_eq!(detector.rules_version(), "test");
    assert!(detector.find_mentions(Some("ראש הממשלה הודיע"), &roster).is_empty());
    assert_eq!(detector.find_mentions(Some("דנה כהן הודיעה"), &roster), vec!["דנה כהן"]);
}

#[test]
fn test_title_outscores_single_content_mention() {
    let roster = fixture_roster();
    let in_title = detector().detect_document(&article("נתניהו תוקף את השופטים", "", ""), &roster);
    let in_content = detector().detect_document(
        &article("", "", "בדיון שנערך אתמול בכנסת דיבר נתניהו על התקציב"),
        &roster,
    );

    let title_score = in_title.detections[0].score;
    let content_score = in_content.detections[0].score;
    assert!(title_score > content_score);
}

#[test]
fn test_document_result_shape() {
    let roster = fixture_roster();
    let doc = article(
        "לפיד: הממשלה איבדה את הדרך",
        "ראש האופוזיציה תקף את הקואליציה",
        "בנאום בכנסת אמר לפיד כי נתניהו \"מוביל את המדינה לאסון\".",
    );
    let result = detector().detect_document(&doc, &roster);

    assert_eq!(result.rules_version, "v1");
    let lapid = result
        .detections
        .iter()
        .find(|d| d.name == "יאיר לפיד")
        .unwrap();
    assert!(lapid.mention_locations.title);
    assert!(lapid.mention_locations.description);
    assert!(lapid.mention_locations.content);
    assert!(lapid.detection_methods.contains(&DetectionMethod::ColonPattern));
    assert!(lapid.detection_methods.contains(&DetectionMethod::Position));
    assert_eq!(result.mentioned_politicians[0], "יאיר לפיד");

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["mentionedPoliticians"].is_array());
    assert!(json["detections"][0]["mentionLocations"]["title"].is_boolean());
}

#[test]
fn test_threshold_override_keeps_low_scorer() {
    let roster = fixture_roster();
    let padding = "מילה ".repeat(150);
    let doc = article("", "", &format!("{padding}ובסוף הגיב בנט בקצרה"));

    let strict = detector().detect_document(&doc, &roster);
    assert_eq!(strict.detections.len(), 1);
    assert!(strict.mentioned_politicians.is_empty());

    let config = DetectionConfig::builder()
        .threshold_override("נפתלי בנט", 0.05)
        .build()
        .unwrap();
    let lenient = MentionDetector::new(&RuleSet::builtin(), &config);
    assert_eq!(
        lenient.detect_document(&doc, &roster).mentioned_politicians,
        vec!["נפתלי בנט"]
    );
}
