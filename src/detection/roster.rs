//! Politician roster loading
//!
//! The roster is the registry of tracked politicians. It is loaded once,
//! never mutated during a detection pass, and passed explicitly to every
//! matching call.
//!
//! Loading is lenient: entries without a `name` are skipped, absent or `null`
//! optional fields default to empty values, and a record whose fields have the wrong
//! type is dropped without failing the rest of the file.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::error::{DetectionError, LoadResult};
use super::normalize::normalize;
use super::text::fold_str;

/// One tracked politician as stored in the registry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoliticianRecord {
    /// Canonical display name (unique key)
    pub name: String,

    /// Alternative surface forms (nicknames, short forms)
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,

    /// Current office title, empty when none
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,

    /// Name collides with common words and needs corroboration
    #[serde(default, deserialize_with = "null_as_default")]
    pub requires_context: bool,

    /// Terms that must appear near an ambiguous match
    #[serde(default, deserialize_with = "null_as_default")]
    pub context_identifiers: Vec<String>,

    /// Party affiliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,

    /// Portrait filename under the images directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Date the current position was confirmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_since: Option<NaiveDate>,
}

/// Registries written by JS tooling carry `null` for empty fields
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PoliticianRecord {
    /// Create a record with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add aliases
    #[must_use]
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Set the current position
    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    /// Require one of `identifiers` near every match
    #[must_use]
    pub fn with_context(mut self, identifiers: &[&str]) -> Self {
        self.requires_context = true;
        self.context_identifiers = identifiers.iter().map(|i| i.to_string()).collect();
        self
    }

    /// Set the position confirmation date
    #[must_use]
    pub fn with_position_since(mut self, since: NaiveDate) -> Self {
        self.position_since = Some(since);
        self
    }
}

/// A roster record with its matching keys precomputed
#[derive(Debug, Clone)]
pub struct RosterEntry {
    record: PoliticianRecord,

    /// Aliases kept after precedence rules, normalized
    aliases: Vec<String>,

    /// Folded context identifiers
    context_keys: Vec<Vec<char>>,
}

impl RosterEntry {
    pub fn record(&self) -> &PoliticianRecord {
        &self.record
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Aliases this politician owns in the roster
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn position(&self) -> &str {
        &self.record.position
    }

    pub fn requires_context(&self) -> bool {
        self.record.requires_context
    }

    pub fn context_keys(&self) -> &[Vec<char>] {
        &self.context_keys
    }

    /// Last word of the canonical name
    pub fn surname(&self) -> Option<&str> {
        let mut parts = self.record.name.split(' ');
        let last = parts.next_back()?;
        // Single-word names have no separate surname
        parts.next().map(|_| last)
    }
}

/// Immutable registry of politicians
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    by_name: HashMap<String, usize>,
}

impl Roster {
    /// Build a roster from records, applying name and alias precedence
    ///
    /// - Records with an empty name are skipped.
    /// - A repeated name keeps the first record.
    /// - An alias equal to any canonical name is dropped.
    /// - An alias claimed by several politicians belongs to the first one.
    pub fn new(records: Vec<PoliticianRecord>) -> Self {
        let mut kept: Vec<PoliticianRecord> = Vec::with_capacity(records.len());
        let mut seen_names: HashSet<Vec<char>> = HashSet::new();

        for mut record in records {
            record.name = normalize(&record.name);
            if record.name.is_empty() {
                tracing::debug!("Skipping roster entry without a name");
                continue;
            }
            if !seen_names.insert(fold_str(&record.name)) {
                tracing::warn!(name = %record.name, "Duplicate roster name, keeping the first entry");
                continue;
            }
            record.position = normalize(&record.position);
            kept.push(record);
        }

        let mut alias_owner: HashMap<Vec<char>, usize> = HashMap::new();
        let mut entries = Vec::with_capacity(kept.len());

        for (idx, record) in kept.into_iter().enumerate() {
            let mut aliases = Vec::new();
            for raw in &record.aliases {
                let alias = normalize(raw);
                if alias.is_empty() {
                    continue;
                }
                let key = fold_str(&alias);
                if seen_names.contains(&key) {
                    if key != fold_str(&record.name) {
                        tracing::warn!(
                            name = %record.name,
                            alias = %alias,
                            "Alias equals another politician's name, ignoring"
                        );
                    }
                    continue;
                }
                match alias_owner.get(&key) {
                    Some(&owner) if owner != idx => {
                        tracing::warn!(
                            name = %record.name,
                            alias = %alias,
                            "Alias already claimed by an earlier roster entry, ignoring"
                        );
                    }
                    Some(_) => {}
                    None => {
                        alias_owner.insert(key, idx);
                        aliases.push(alias);
                    }
                }
            }

            let context_keys = record
                .context_identifiers
                .iter()
                .map(|c| fold_str(&normalize(c)))
                .filter(|k| !k.is_empty())
                .collect();

            entries.push(RosterEntry {
                record,
                aliases,
                context_keys,
            });
        }

        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name().to_string(), i))
            .collect();

        Self { entries, by_name }
    }

    /// Parse a JSON array of records
    ///
    /// Individual malformed entries are skipped; only a document that is not
    /// a JSON array is an error.
    pub fn from_json_str(json: &str) -> LoadResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let items = value
            .as_array()
            .ok_or_else(|| DetectionError::roster_parse_failed("expected a JSON array of records"))?;

        let mut records = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let has_name = item
                .get("name")
                .and_then(|n| n.as_str())
                .is_some_and(|n| !n.trim().is_empty());
            if !has_name {
                continue;
            }
            match serde_json::from_value::<PoliticianRecord>(item.clone()) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(index = i, error = %e, "Skipping malformed roster entry");
                }
            }
        }

        Ok(Self::new(records))
    }

    /// Load a roster JSON file
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DetectionError::io_error("read roster", Some(path.to_path_buf()), e))?;
        let roster = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), politicians = roster.len(), "Roster loaded");
        Ok(roster)
    }

    /// Load a roster, degrading to an empty one on failure
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(roster) => roster,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Roster unavailable, continuing with an empty roster"
                );
                Self::default()
            }
        }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Lookup by canonical name
    pub fn get(&self, name: &str) -> Option<&RosterEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
