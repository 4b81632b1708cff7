//! Portrait assignment
//!
//! Links roster records to portrait files (`<name>.png`) in an images
//! directory. Filenames and names are compared through
//! [`normalize_image_key`], trying the canonical name, then each alias,
//! then any file whose key contains every part of the name.
//!
//! Assignment works on the roster file's raw JSON so that fields the
//! detector does not model, and entries it would skip, are written back
//! untouched.

use serde_json::Value;
use std::path::Path;

use super::error::{DetectionError, LoadResult};
use super::normalize::normalize;

/// Portrait file extension (case-insensitive)
const PORTRAIT_EXTENSION: &str = "png";

/// Key used to compare names with filenames
///
/// Double quotes are dropped; spaces, hyphens and apostrophes become `_`.
///
/// ```
/// use mivzak::detection::images::normalize_image_key;
///
/// assert_eq!(normalize_image_key("איתמר בן-גביר"), "איתמר_בן_גביר");
/// assert_eq!(normalize_image_key("ח\"כ ג'ו"), "חכ_ג_ו");
/// ```
pub fn normalize_image_key(s: &str) -> String {
    normalize(s)
        .chars()
        .filter(|&c| c != '"')
        .map(|c| if is_separator(c) { '_' } else { c })
        .collect()
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '\'')
}

/// Outcome of an assignment pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReport {
    /// Records that received an image
    pub assigned: usize,

    /// Named records in the file
    pub total: usize,

    /// Names with no matching portrait
    pub missing: Vec<String>,
}

struct Portrait<'a> {
    key: String,
    filename: &'a str,
}

/// Set the `image` field of every named roster entry that has a portrait
///
/// Takes the roster file's JSON and returns it pretty-printed with images
/// filled in. Entries without a match keep their current image; entries
/// without a name and keys other than `image` are left as they were.
pub fn assign_images(roster_json: &str, filenames: &[String]) -> LoadResult<(String, ImageReport)> {
    let mut value: Value = serde_json::from_str(roster_json)?;
    let items = value
        .as_array_mut()
        .ok_or_else(|| DetectionError::roster_parse_failed("expected a JSON array of records"))?;

    let portraits: Vec<Portrait<'_>> = filenames
        .iter()
        .filter(|f| is_portrait(f))
        .map(|f| Portrait {
            key: file_key(f),
            filename: f.as_str(),
        })
        .collect();

    let mut report = ImageReport::default();
    for item in items.iter_mut() {
        let Some(object) = item.as_object_mut() else {
            continue;
        };
        let name = match object.get("name").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => continue,
        };
        let aliases: Vec<&str> = object
            .get("aliases")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        report.total += 1;
        match find_portrait(&name, &aliases, &portraits) {
            Some(filename) => {
                let filename = filename.to_string();
                object.insert("image".to_string(), Value::String(filename));
                report.assigned += 1;
            }
            None => {
                tracing::info!(name = %name, "No portrait found");
                report.missing.push(name);
            }
        }
    }

    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| DetectionError::other(format!("serialize roster: {e}")))?;
    Ok((json, report))
}

fn find_portrait<'a>(name: &str, aliases: &[&str], portraits: &[Portrait<'a>]) -> Option<&'a str> {
    let by_key = |key: &str| portraits.iter().find(|p| p.key == key);

    by_key(&normalize_image_key(name))
        .or_else(|| {
            aliases
                .iter()
                .find_map(|alias| by_key(&normalize_image_key(alias)))
        })
        .or_else(|| {
            let parts: Vec<String> = name
                .split(|c: char| is_separator(c) || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .map(normalize_image_key)
                .collect();
            if parts.is_empty() {
                return None;
            }
            portraits
                .iter()
                .find(|p| parts.iter().all(|part| p.key.contains(part.as_str())))
        })
        .map(|p| p.filename)
}

/// Portrait filenames in `dir`, sorted
pub fn list_portraits(dir: &Path) -> LoadResult<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| DetectionError::io_error("list portraits", Some(dir.to_path_buf()), e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| DetectionError::io_error("list portraits", Some(dir.to_path_buf()), e))?;
        if let Some(name) = entry.file_name().to_str() {
            if is_portrait(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn is_portrait(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(PORTRAIT_EXTENSION))
}

/// Filename stem with separators mapped to `_`
fn file_key(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    normalize(stem)
        .chars()
        .map(|c| if is_separator(c) { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn image_of<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .find(|item| item["name"] == name)
            .and_then(|item| item.get("image"))
            .and_then(Value::as_str)
    }

    #[test]
    fn test_assign_by_name_alias_and_parts() {
        let roster = r#"[
            {"name": "בנימין נתניהו", "aliases": ["ביבי"]},
            {"name": "יאיר לפיד"},
            {"name": "איתמר בן גביר"},
            {"name": "בני גנץ"}
        ]"#;
        let (json, report) = assign_images(
            roster,
            &files(&["ביבי.png", "יאיר_לפיד.PNG", "השר_איתמר_בן-גביר.png", "readme.txt"]),
        )
        .unwrap();

        assert_eq!(report.assigned, 3);
        assert_eq!(report.total, 4);
        assert_eq!(report.missing, vec!["בני גנץ"]);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(image_of(&value, "בנימין נתניהו"), Some("ביבי.png"));
        assert_eq!(image_of(&value, "יאיר לפיד"), Some("יאיר_לפיד.PNG"));
        assert_eq!(image_of(&value, "איתמר בן גביר"), Some("השר_איתמר_בן-גביר.png"));
        assert_eq!(image_of(&value, "בני גנץ"), None);
    }

    #[test]
    fn test_write_back_keeps_unmodelled_data() {
        let roster = r#"[
            {"name": "בני  גנץ", "id": 17, "twitter": "gantzbe"},
            {"name": "יאיר לפיד", "aliases": null, "image": "old.png"},
            {"name": "", "party": "ללא"},
            "not a record"
        ]"#;
        let (json, report) =
            assign_images(roster, &files(&["בני_גנץ.png", "יאיר_לפיד.png"])).unwrap();
        assert_eq!(report.assigned, 2);
        assert_eq!(report.total, 2);

        let value: Value = serde_json::from_str(&json).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0]["name"], "בני  גנץ");
        assert_eq!(items[0]["id"], 17);
        assert_eq!(items[0]["twitter"], "gantzbe");
        assert_eq!(items[0]["image"], "בני_גנץ.png");
        assert!(items[1]["aliases"].is_null());
        assert_eq!(items[1]["image"], "יאיר_לפיד.png");
        assert_eq!(items[2], serde_json::json!({"name": "", "party": "ללא"}));
        assert_eq!(items[3], "not a record");

        let keys: Vec<&str> = items[0].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "id", "twitter", "image"]);
    }

    #[test]
    fn test_unmatched_keeps_existing_image() {
        let roster = r#"[{"name": "יאיר לפיד", "image": "old.png"}]"#;
        let (json, report) = assign_images(roster, &files(&["אחר.png"])).unwrap();
        assert_eq!(report.missing, vec!["יאיר לפיד"]);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(image_of(&value, "יאיר לפיד"), Some("old.png"));
    }

    #[test]
    fn test_non_array_rejected() {
        let err = assign_images(r#"{"name": "יאיר לפיד"}"#, &[]).unwrap_err();
        assert!(matches!(err, DetectionError::RosterParseFailed { .. }));
    }

    #[test]
    fn test_non_png_ignored() {
        let (_, report) =
            assign_images(r#"[{"name": "יאיר לפיד"}]"#, &files(&["יאיר_לפיד.jpg"])).unwrap();
        assert_eq!(report.assigned, 0);
    }

    #[test]
    fn test_list_portraits() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.PNG", "c.jpg"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        assert_eq!(list_portraits(dir.path()).unwrap(), vec!["a.PNG", "b.png"]);
        assert!(list_portraits(&dir.path().join("missing")).is_err());
    }
}
