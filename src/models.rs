// Core data structures for mivzak

use serde::{Deserialize, Serialize};

use crate::detection::aggregator::SourceField;
use crate::detection::normalize::{clean_text, CleanOptions};

/// Article fields consumed by detection
///
/// Every field is optional; a missing field is treated as empty text.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    /// Article with only body text
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Text of one field
    pub fn field(&self, field: SourceField) -> Option<&str> {
        match field {
            SourceField::Title => self.title.as_deref(),
            SourceField::Description => self.description.as_deref(),
            SourceField::Content => self.content.as_deref(),
        }
    }

    /// Copy with HTML, URLs and other noise stripped from every field
    #[must_use]
    pub fn cleaned(&self, options: CleanOptions) -> Self {
        let clean = |f: &Option<String>| f.as_deref().map(|t| clean_text(Some(t), options));
        Self {
            id: self.id.clone(),
            title: clean(&self.title),
            description: clean(&self.description),
            content: clean(&self.content),
        }
    }

    /// True when no field has any text
    pub fn is_empty(&self) -> bool {
        SourceField::ALL
            .iter()
            .all(|&f| self.field(f).map_or(true, |t| t.trim().is_empty()))
    }
}
