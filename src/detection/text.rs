//! Offset-indexed view over a normalized field
//!
//! Matching works on Unicode scalar offsets rather than regexes: the text is
//! normalized once, case-folded char-by-char (so offsets stay aligned with the
//! normalized form) and a prefix count of real quotation marks is built so
//! quoted-span tests are O(1).

use super::normalize::normalize_text;

/// A normalized, case-folded text with quote bookkeeping
#[derive(Debug, Clone, Default)]
pub struct IndexedText {
    /// Case-folded characters, one per normalized char
    folded: Vec<char>,

    /// `quotes_before[i]` = number of quote marks in `folded[..i]`
    quotes_before: Vec<u32>,

    /// Offsets of quotation marks, ascending (includes opening single quotes)
    quote_positions: Vec<usize>,
}

impl IndexedText {
    /// Normalize and index raw text (`None` yields an empty index)
    pub fn new(raw: Option<&str>) -> Self {
        Self::index(&normalize_text(raw))
    }

    fn index(normalized: &str) -> Self {
        let folded: Vec<char> = normalized.chars().map(fold_char).collect();

        let mut quotes_before = Vec::with_capacity(folded.len() + 1);
        let mut quote_positions = Vec::new();
        let mut count = 0u32;
        quotes_before.push(0);
        for i in 0..folded.len() {
            if is_quote_mark(&folded, i) {
                count += 1;
                quote_positions.push(i);
            } else if is_opening_single_quote(&folded, i) {
                quote_positions.push(i);
            }
            quotes_before.push(count);
        }

        Self {
            folded,
            quotes_before,
            quote_positions,
        }
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.folded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// Folded char at `i`, `None` outside the text
    pub fn char_at(&self, i: usize) -> Option<char> {
        self.folded.get(i).copied()
    }

    /// Char before `i`, `None` at the start
    pub fn char_before(&self, i: usize) -> Option<char> {
        i.checked_sub(1).and_then(|j| self.char_at(j))
    }

    /// Folded chars
    pub fn chars(&self) -> &[char] {
        &self.folded
    }

    /// True when offset `i` lies inside a double-quoted span
    pub fn in_quotes(&self, i: usize) -> bool {
        let i = i.min(self.folded.len());
        self.quotes_before[i] % 2 == 1
    }

    /// Next occurrence of `needle` at or after `from`
    ///
    /// A space inside the needle also matches a hyphen, so a multi-word name
    /// is found in its maqaf spelling ("בן גביר" in "בן-גביר").
    pub fn find_from(&self, needle: &[char], from: usize) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.folded.len() {
            return None;
        }
        let last = self.folded.len() - needle.len();
        (from..=last).find(|&i| {
            self.folded[i..i + needle.len()]
                .iter()
                .zip(needle)
                .all(|(&t, &k)| t == k || (k == ' ' && t == '-'))
        })
    }

    /// True if `needle` occurs anywhere in `[start, end)`
    pub fn contains_in(&self, needle: &[char], start: usize, end: usize) -> bool {
        let end = end.min(self.folded.len());
        if needle.is_empty() || start >= end || end - start < needle.len() {
            return false;
        }
        self.folded[start..end]
            .windows(needle.len())
            .any(|w| w == needle)
    }

    /// Distance in chars from `[start, end)` to the nearest quotation mark
    pub fn distance_to_quote(&self, start: usize, end: usize) -> Option<usize> {
        let idx = self.quote_positions.partition_point(|&p| p < start);
        let before = idx
            .checked_sub(1)
            .map(|j| start - self.quote_positions[j]);
        let after = self.quote_positions.get(idx).map(|&p| {
            if p < end {
                0
            } else {
                p + 1 - end
            }
        });
        match (before, after) {
            (Some(b), Some(a)) => Some(b.min(a)),
            (b, a) => b.or(a),
        }
    }
}

/// Fold a character for case-insensitive comparison
pub fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Fold a normalized string into comparable chars
pub fn fold_str(s: &str) -> Vec<char> {
    s.chars().map(fold_char).collect()
}

/// Straight quote characters after normalization
pub fn is_quote_char(c: char) -> bool {
    c == '"' || c == '\''
}

/// A `"` counts as a quotation mark unless it sits between two letters,
/// where it is an in-word gershayim (צה"ל, יו"ר)
fn is_quote_mark(chars: &[char], i: usize) -> bool {
    if chars[i] != '"' {
        return false;
    }
    let before = i.checked_sub(1).map(|j| chars[j]);
    let after = chars.get(i + 1).copied();
    !matches!((before, after), (Some(b), Some(a)) if b.is_alphabetic() && a.is_alphabetic())
}

/// A `'` not preceded by a letter opens a single-quoted span; after a
/// letter it is usually a geresh (ג'ו, סמוטריץ')
fn is_opening_single_quote(chars: &[char], i: usize) -> bool {
    chars[i] == '\''
        && !i
            .checked_sub(1)
            .map(|j| chars[j].is_alphabetic())
            .unwrap_or(false)
}
