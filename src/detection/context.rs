//! Context validation for ambiguous names
//!
//! Some surnames are also ordinary words ("כץ", "ברק", "גולן"). Records
//! flagged with `requiresContext` only count when one of their
//! `contextIdentifiers` appears as a word (prefixes allowed) within a fixed
//! radius of the match.

use super::boundary::BoundaryMatcher;
use super::roster::RosterEntry;
use super::text::IndexedText;

/// Default radius in chars on each side of a match
pub const DEFAULT_CONTEXT_RADIUS: usize = 200;

/// Checks that ambiguous matches have corroborating terms nearby
#[derive(Debug, Clone, Copy)]
pub struct ContextValidator {
    radius: usize,
}

impl Default for ContextValidator {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_RADIUS)
    }
}

impl ContextValidator {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Whether a match at `[offset, offset + length)` is acceptable for `entry`
    ///
    /// The window is clipped to the document and excludes the matched span,
    /// so a name never corroborates itself.
    pub fn has_required_context(
        &self,
        text: &IndexedText,
        entry: &RosterEntry,
        offset: usize,
        length: usize,
    ) -> bool {
        if !entry.requires_context() {
            return true;
        }

        let keys = entry.context_keys();
        if keys.is_empty() {
            tracing::warn!(
                name = %entry.name(),
                "requiresContext is set without contextIdentifiers, accepting match"
            );
            return true;
        }

        let end = offset.saturating_add(length).min(text.len());
        let window_start = offset.saturating_sub(self.radius);
        let window_end = end.saturating_add(self.radius).min(text.len());

        let matcher = BoundaryMatcher::plain();
        let found = keys.iter().any(|key| {
            matcher
                .matches_key(text, key.as_slice())
                .take_while(|m| m.start < window_end)
                .any(|m| {
                    let left = m.token_start() >= window_start && m.end <= offset;
                    let right = m.token_start() >= end && m.end <= window_end;
                    left || right
                })
        });

        if !found {
            tracing::trace!(name = %entry.name(), offset, "No context identifier near match");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::roster::{PoliticianRecord, Roster};

    fn roster() -> Roster {
        Roster::new(vec![
            PoliticianRecord::new("ישראל כץ").with_context(&["שר", "הליכוד"]),
            PoliticianRecord::new("אבי דיכטר").with_context(&[]),
            PoliticianRecord::new("בני גנץ"),
        ])
    }

    #[test]
    fn test_not_required() {
        let roster = roster();
        let text = IndexedText::new(Some("בני גנץ"));
        let validator = ContextValidator::default();
        assert!(validator.has_required_context(&text, roster.get("בני גנץ").unwrap(), 0, 7));
    }

    #[test]
    fn test_empty_identifiers_is_permissive() {
        let roster = roster();
        let text = IndexedText::new(Some("אבי דיכטר"));
        let validator = ContextValidator::default();
        assert!(validator.has_required_context(&text, roster.get("אבי דיכטר").unwrap(), 0, 9));
    }

    #[test]
    fn test_identifier_in_window() {
        let roster = roster();
        let entry = roster.get("ישראל כץ").unwrap();
        let text = IndexedText::new(Some("בכנס הליכוד נאם ישראל כץ"));
        let validator = ContextValidator::default();
        assert!(validator.has_required_context(&text, entry, 16, 8));

        let text = IndexedText::new(Some("ישראל כץ, לשעבר השר"));
        assert!(validator.has_required_context(&text, entry, 0, 8));
    }

    #[test]
    fn test_identifier_missing() {
        let roster = roster();
        let entry = roster.get("ישראל כץ").unwrap();
        let text = IndexedText::new(Some("ישראל כץ פתח מסעדה"));
        let validator = ContextValidator::default();
        assert!(!validator.has_required_context(&text, entry, 0, 8));

        // Identifier embedded in a longer word does not count
        let text = IndexedText::new(Some("ישראל כץ שרטט מפה"));
        assert!(!validator.has_required_context(&text, entry, 0, 8));
    }

    #[test]
    fn test_identifier_outside_radius() {
        let roster = roster();
        let entry = roster.get("ישראל כץ").unwrap();
        let text = IndexedText::new(Some("הליכוד אמר היום ישראל כץ"));
        let narrow = ContextValidator::new(5);
        assert!(!narrow.has_required_context(&text, entry, 16, 8));
        assert!(ContextValidator::new(16).has_required_context(&text, entry, 16, 8));
    }
}
