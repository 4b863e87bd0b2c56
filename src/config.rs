//! Extraction tuning knobs.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use crate::error::{ExtractorError, ExtractorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How two accepted candidates are judged to be "the same" result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Same code from the same sender collapses; different senders are kept apart.
    #[default]
    CodeSender,
    /// Same code collapses regardless of sender.
    Code,
}

/// Which characters a code may consist of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCharset {
    #[default]
    Numeric,
    /// Uppercase letters and digits, at least one of each.
    Alphanumeric,
}

/// Additive score contributions used by the context scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub tier_high: f64,
    pub tier_medium: f64,
    pub tier_low: f64,
    pub keyword_high: f64,
    pub keyword_medium: f64,
    pub keyword_low: f64,
    pub isolated: f64,
    pub spaced: f64,
    pub attached: f64,
    pub near_top: f64,
    pub in_subject: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            tier_high: 3.0,
            tier_medium: 2.0,
            tier_low: 1.0,
            keyword_high: 3.0,
            keyword_medium: 2.0,
            keyword_low: 1.0,
            isolated: 2.0,
            spaced: 1.5,
            attached: 0.8,
            near_top: 1.5,
            in_subject: 2.0,
        }
    }
}

impl ScoreWeights {
    fn all(&self) -> [f64; 11] {
        [
            self.tier_high,
            self.tier_medium,
            self.tier_low,
            self.keyword_high,
            self.keyword_medium,
            self.keyword_low,
            self.isolated,
            self.spaced,
            self.attached,
            self.near_top,
            self.in_subject,
        ]
    }
}

/// Configuration for a single extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters inspected on each side of a candidate
    pub context_window: usize,
    /// Clean bodies longer than this (in chars) are truncated
    pub max_body_chars: usize,
    /// Fraction of the content counted as "near the top"
    pub position_ratio: f64,
    /// Scores closer than this are ranked by recency
    pub tie_epsilon: f64,
    pub min_year: u16,
    pub max_year: u16,
    /// Treat every 5-digit code as a possible ZIP code
    pub reject_zip_shape: bool,
    pub dedup: DedupMode,
    pub charset: CodeCharset,
    pub weights: ScoreWeights,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            context_window: 100,
            max_body_chars: 50_000,
            position_ratio: 0.3,
            tie_epsilon: 0.1,
            min_year: 2015,
            max_year: 2035,
            reject_zip_shape: true,
            dedup: DedupMode::CodeSender,
            charset: CodeCharset::Numeric,
            weights: ScoreWeights::default(),
        }
    }
}

impl ExtractionConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> ExtractorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ExtractorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_context_window(mut self, chars: usize) -> Self {
        self.context_window = chars;
        self
    }

    pub fn with_max_body_chars(mut self, chars: usize) -> Self {
        self.max_body_chars = chars;
        self
    }

    pub fn with_dedup(mut self, mode: DedupMode) -> Self {
        self.dedup = mode;
        self
    }

    pub fn with_charset(mut self, charset: CodeCharset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_zip_rejection(mut self, enabled: bool) -> Self {
        self.reject_zip_shape = enabled;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Checks that every value is in a usable range.
    pub fn validate(&self) -> ExtractorResult<()> {
        if self.context_window == 0 {
            return Err(ExtractorError::config("context_window must be positive"));
        }
        if self.max_body_chars == 0 {
            return Err(ExtractorError::config("max_body_chars must be positive"));
        }
        if !(self.position_ratio > 0.0 && self.position_ratio <= 1.0) {
            return Err(ExtractorError::config(format!(
                "position_ratio must be in (0, 1], got {}",
                self.position_ratio
            )));
        }
        if self.tie_epsilon.is_nan() || self.tie_epsilon < 0.0 {
            return Err(ExtractorError::config(format!(
                "tie_epsilon must be non-negative, got {}",
                self.tie_epsilon
            )));
        }
        if self.min_year > self.max_year {
            return Err(ExtractorError::config(format!(
                "year range is inverted: {}..={}",
                self.min_year, self.max_year
            )));
        }
        if self.weights.all().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ExtractorError::config(
                "score weights must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
