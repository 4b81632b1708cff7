//! Text normalization for Hebrew article fields
//!
//! Every string that takes part in matching (article text, names, aliases,
//! titles, context identifiers) goes through [`normalize_text`] first so that
//! typographic variants compare equal:
//!
//! 1. Remove zero-width and bidi formatting characters
//! 2. Collapse quotation-mark variants to `"` and `'`
//! 3. Collapse dash variants (including the Hebrew maqaf) to `-`
//! 4. Map Hebrew presentation forms (wide and dagesh letters, including the
//!    final forms ך ם ף) to their standard letters
//! 5. Collapse whitespace runs to a single space and trim
//!
//! [`clean_text`] additionally strips HTML, URLs and, on request,
//! punctuation and niqqud.

use regex::Regex;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#).unwrap());

/// Options for [`clean_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    /// Decode HTML entities and remove tags
    pub strip_html: bool,

    /// Remove http(s) and www URLs
    pub strip_urls: bool,

    /// Replace punctuation with spaces
    pub strip_punctuation: bool,

    /// Remove Hebrew vowel points and cantillation marks
    pub strip_niqqud: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            strip_html: true,
            strip_urls: true,
            strip_punctuation: false,
            strip_niqqud: false,
        }
    }
}

impl CleanOptions {
    /// Strip everything, used for loose comparisons
    pub fn aggressive() -> Self {
        Self {
            strip_html: true,
            strip_urls: true,
            strip_punctuation: true,
            strip_niqqud: true,
        }
    }
}

/// Canonicalize a raw string for matching
///
/// `None` and empty input yield an empty string.
///
/// # Examples
///
/// ```
/// use mivzak::detection::normalize::normalize_text;
///
/// assert_eq!(normalize_text(Some("  \u{201C}שלום\u{201D}\u{2014}עולם  ")), "\"שלום\"-עולם");
/// assert_eq!(normalize_text(None), "");
/// ```
pub fn normalize_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_invisible(c) {
            continue;
        }
        if c.is_whitespace() || c.is_control() {
            // Non-whitespace control characters are dropped outright
            if c.is_whitespace() {
                pending_space = true;
            }
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(map_char(c));
    }

    out
}

/// Shorthand for [`normalize_text`] on a borrowed string
pub fn normalize(text: &str) -> String {
    normalize_text(Some(text))
}

/// Normalize and additionally strip markup and noise
///
/// # Examples
///
/// ```
/// use mivzak::detection::normalize::{clean_text, CleanOptions};
///
/// let html = "<p>נתניהו&nbsp;אמר</p> https://example.com/a";
/// assert_eq!(clean_text(Some(html), CleanOptions::default()), "נתניהו אמר");
/// ```
pub fn clean_text(text: Option<&str>, options: CleanOptions) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut result = text.to_string();

    if options.strip_html {
        result = html_escape::decode_html_entities(&result).into_owned();
        result = TAG_REGEX.replace_all(&result, " ").into_owned();
    }

    if options.strip_urls {
        result = URL_REGEX.replace_all(&result, " ").into_owned();
    }

    if options.strip_niqqud {
        result = result.chars().filter(|c| !is_niqqud(*c)).collect();
    }

    let mut normalized = normalize(&result);

    if options.strip_punctuation {
        let spaced: String = normalized
            .chars()
            .map(|c| if is_strippable_punctuation(c) { ' ' } else { c })
            .collect();
        normalized = normalize(&spaced);
    }

    normalized
}

/// Map a single character to its canonical form
fn map_char(c: char) -> char {
    match c {
        // Double quotes, Hebrew gershayim, guillemets
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{05F4}' | '\u{00AB}'
        | '\u{00BB}' | '\u{2033}' | '\u{FF02}' => '"',
        // Single quotes, Hebrew geresh, prime, backtick, acute
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{05F3}' | '\u{2032}'
        | '\u{0060}' | '\u{00B4}' | '\u{FF07}' => '\'',
        // Hyphen, non-breaking hyphen, figure/en/em dashes, bar, minus, maqaf
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' | '\u{05BE}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => '-',
        '\u{FB1D}'..='\u{FB4F}' => map_presentation_form(c),
        other => other,
    }
}

/// Hebrew presentation forms (alphabetic presentation block) to base letters
fn map_presentation_form(c: char) -> char {
    match c {
        '\u{FB1D}' => 'י',
        '\u{FB1F}' => 'ײ',
        '\u{FB20}' => 'ע',
        '\u{FB21}' | '\u{FB2E}' | '\u{FB2F}' | '\u{FB30}' | '\u{FB4F}' => 'א',
        '\u{FB22}' | '\u{FB33}' => 'ד',
        '\u{FB23}' | '\u{FB34}' => 'ה',
        '\u{FB24}' | '\u{FB3B}' | '\u{FB4D}' => 'כ',
        '\u{FB25}' | '\u{FB3C}' => 'ל',
        '\u{FB26}' => 'ם',
        '\u{FB27}' | '\u{FB48}' => 'ר',
        '\u{FB28}' | '\u{FB4A}' => 'ת',
        '\u{FB29}' => '+',
        '\u{FB2A}'..='\u{FB2D}' | '\u{FB49}' => 'ש',
        '\u{FB31}' | '\u{FB4C}' => 'ב',
        '\u{FB32}' => 'ג',
        '\u{FB35}' | '\u{FB4B}' => 'ו',
        '\u{FB36}' => 'ז',
        '\u{FB38}' => 'ט',
        '\u{FB39}' => 'י',
        '\u{FB3A}' => 'ך',
        '\u{FB3E}' => 'מ',
        '\u{FB40}' => 'נ',
        '\u{FB41}' => 'ס',
        '\u{FB43}' => 'ף',
        '\u{FB44}' | '\u{FB4E}' => 'פ',
        '\u{FB46}' => 'צ',
        '\u{FB47}' => 'ק',
        other => other,
    }
}

/// Zero-width, bidi and BOM characters
fn is_invisible(c: char) -> bool {
    matches!(c,
        '\u{200B}'..='\u{200F}' |
        '\u{202A}'..='\u{202E}' |
        '\u{2060}'..='\u{2064}' |
        '\u{2066}'..='\u{2069}' |
        '\u{00AD}' |
        '\u{FEFF}'
    )
}

/// Hebrew points and cantillation, excluding maqaf, paseq and sof pasuq
pub fn is_niqqud(c: char) -> bool {
    matches!(c,
        '\u{0591}'..='\u{05BD}' |
        '\u{05BF}' |
        '\u{05C1}'..='\u{05C2}' |
        '\u{05C4}'..='\u{05C5}' |
        '\u{05C7}'
    )
}

fn is_strippable_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !is_niqqud(c)
}
