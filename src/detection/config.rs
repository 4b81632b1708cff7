//! Detection tunables
//!
//! Every constant the pipeline uses (window radii, alias length floor,
//! scoring weights, thresholds) lives in [`DetectionConfig`] so runs can be
//! tuned from `config.toml` without code changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::context::DEFAULT_CONTEXT_RADIUS;
use super::error::DetectionError;
use super::position::{
    PositionOptions, TieBreak, DEFAULT_CORROBORATION_WINDOW, DEFAULT_POSITION_WINDOW,
};
use super::scoring::{
    ScoringWeights, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_EARLY_CONTENT_CHARS,
    DEFAULT_QUOTE_PROXIMITY,
};

/// Default minimum alias length in chars
pub const DEFAULT_MIN_ALIAS_LENGTH: usize = 3;

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Radius around an ambiguous match searched for context identifiers
    pub context_radius: usize,

    /// Radius around a title searched for disqualifying modifiers
    pub position_window: usize,

    /// Require a surname or alias near a title before attributing it
    pub require_position_corroboration: bool,

    /// Radius used for position corroboration
    pub corroboration_window: usize,

    /// Policy when several roster entries hold the same title
    pub tie_break: TieBreak,

    /// Aliases shorter than this are ignored
    pub min_alias_length: usize,

    /// First content mention before this offset counts as early
    pub early_content_chars: usize,

    /// Max distance to a quotation mark for the near-quote bonus
    pub quote_proximity: usize,

    /// Global inclusion threshold
    pub confidence_threshold: f64,

    /// Scoring weights
    pub weights: ScoringWeights,

    /// Per-name thresholds overriding the global one
    pub threshold_overrides: BTreeMap<String, f64>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
            position_window: DEFAULT_POSITION_WINDOW,
            require_position_corroboration: false,
            corroboration_window: DEFAULT_CORROBORATION_WINDOW,
            tie_break: TieBreak::default(),
            min_alias_length: DEFAULT_MIN_ALIAS_LENGTH,
            early_content_chars: DEFAULT_EARLY_CONTENT_CHARS,
            quote_proximity: DEFAULT_QUOTE_PROXIMITY,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            weights: ScoringWeights::default(),
            threshold_overrides: BTreeMap::new(),
        }
    }
}

impl DetectionConfig {
    /// Create a new builder for DetectionConfig
    pub fn builder() -> DetectionConfigBuilder {
        DetectionConfigBuilder::default()
    }

    /// Options for the position resolver
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            window: self.position_window,
            tie_break: self.tie_break,
            require_corroboration: self.require_position_corroboration,
            corroboration_window: self.corroboration_window,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DetectionError> {
        for (field, value) in [
            ("context_radius", self.context_radius),
            ("position_window", self.position_window),
            ("corroboration_window", self.corroboration_window),
            ("min_alias_length", self.min_alias_length),
        ] {
            if value == 0 {
                return Err(DetectionError::invalid_config(field, "0", "Must be at least 1"));
            }
        }

        check_unit_interval("confidence_threshold", self.confidence_threshold)?;
        for (name, threshold) in &self.threshold_overrides {
            check_unit_interval(&format!("threshold_overrides.{name}"), *threshold)?;
        }

        for (field, weight) in self.weights.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DetectionError::invalid_config(
                    format!("weights.{field}"),
                    weight.to_string(),
                    "Must be a non-negative number",
                ));
            }
        }

        Ok(())
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), DetectionError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DetectionError::invalid_config(
            field,
            value.to_string(),
            "Must be between 0.0 and 1.0",
        ));
    }
    Ok(())
}

/// Builder for DetectionConfig with fluent API
#[derive(Debug, Clone, Default)]
pub struct DetectionConfigBuilder {
    context_radius: Option<usize>,
    position_window: Option<usize>,
    require_position_corroboration: Option<bool>,
    corroboration_window: Option<usize>,
    tie_break: Option<TieBreak>,
    min_alias_length: Option<usize>,
    early_content_chars: Option<usize>,
    quote_proximity: Option<usize>,
    confidence_threshold: Option<f64>,
    weights: Option<ScoringWeights>,
    threshold_overrides: BTreeMap<String, f64>,
}

impl DetectionConfigBuilder {
    pub fn context_radius(mut self, radius: usize) -> Self {
        self.context_radius = Some(radius);
        self
    }

    pub fn position_window(mut self, window: usize) -> Self {
        self.position_window = Some(window);
        self
    }

    /// Require name corroboration for title-only detections
    pub fn require_position_corroboration(mut self, enable: bool) -> Self {
        self.require_position_corroboration = Some(enable);
        self
    }

    pub fn corroboration_window(mut self, window: usize) -> Self {
        self.corroboration_window = Some(window);
        self
    }

    pub fn tie_break(mut self, policy: TieBreak) -> Self {
        self.tie_break = Some(policy);
        self
    }

    pub fn min_alias_length(mut self, len: usize) -> Self {
        self.min_alias_length = Some(len);
        self
    }

    pub fn early_content_chars(mut self, chars: usize) -> Self {
        self.early_content_chars = Some(chars);
        self
    }

    pub fn quote_proximity(mut self, chars: usize) -> Self {
        self.quote_proximity = Some(chars);
        self
    }

    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Lower (or raise) the threshold for one politician
    pub fn threshold_override(mut self, name: impl Into<String>, threshold: f64) -> Self {
        self.threshold_overrides.insert(name.into(), threshold);
        self
    }

    /// Build the config with validation
    pub fn build(self) -> Result<DetectionConfig, DetectionError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation (for testing)
    pub fn build_unchecked(self) -> DetectionConfig {
        let defaults = DetectionConfig::default();
        DetectionConfig {
            context_radius: self.context_radius.unwrap_or(defaults.context_radius),
            position_window: self.position_window.unwrap_or(defaults.position_window),
            require_position_corroboration: self
                .require_position_corroboration
                .unwrap_or(defaults.require_position_corroboration),
            corroboration_window: self
                .corroboration_window
                .unwrap_or(defaults.corroboration_window),
            tie_break: self.tie_break.unwrap_or(defaults.tie_break),
            min_alias_length: self.min_alias_length.unwrap_or(defaults.min_alias_length),
            early_content_chars: self
                .early_content_chars
                .unwrap_or(defaults.early_content_chars),
            quote_proximity: self.quote_proximity.unwrap_or(defaults.quote_proximity),
            confidence_threshold: self
                .confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
            weights: self.weights.unwrap_or(defaults.weights),
            threshold_overrides: self.threshold_overrides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DetectionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = DetectionConfig::builder()
            .context_radius(120)
            .tie_break(TieBreak::MostRecentlyConfirmed)
            .threshold_override("דונלד טראמפ", 0.1)
            .build()
            .unwrap();
        assert_eq!(config.context_radius, 120);
        assert_eq!(config.position_window, DEFAULT_POSITION_WINDOW);
        assert_eq!(config.threshold_overrides.get("דונלד טראמפ"), Some(&0.1));
        assert_eq!(config.position_options().tie_break, TieBreak::MostRecentlyConfirmed);
    }

    #[test]
    fn test_builder_validation() {
        let err = DetectionConfig::builder().min_alias_length(0).build().unwrap_err();
        assert!(err.to_string().contains("min_alias_length"));

        let err = DetectionConfig::builder()
            .confidence_threshold(1.5)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));

        let err = DetectionConfig::builder()
            .threshold_override("x", -0.1)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("threshold_overrides.x"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ScoringWeights {
            title: -1.0,
            ..Default::default()
        };
        let err = DetectionConfig::builder().weights(weights).build().unwrap_err();
        assert!(err.to_string().contains("weights.title"));
    }

    #[test]
    fn test_build_unchecked_skips_validation() {
        let config = DetectionConfig::builder().context_radius(0).build_unchecked();
        assert_eq!(config.context_radius, 0);
    }

    #[test]
    fn test_partial_toml() {
        let config: DetectionConfig = toml::from_str(
            r#"
context_radius = 150
tie_break = "most_recently_confirmed"

[weights]
title = 0.6

[threshold_overrides]
"דונלד טראמפ" = 0.1
"#,
        )
        .unwrap();
        assert_eq!(config.context_radius, 150);
        assert_eq!(config.tie_break, TieBreak::MostRecentlyConfirmed);
        assert_eq!(config.weights.title, 0.6);
        assert_eq!(config.weights.description, 0.25);
        assert_eq!(config.min_alias_length, DEFAULT_MIN_ALIAS_LENGTH);
    }
}
