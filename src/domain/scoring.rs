//! Context scoring for candidate codes.
//!
//! A score is the plain sum of independent contributions, so every factor
//! can be reported on its own (see [`ScoreBreakdown`]).

use super::candidate::{Candidate, FormatCue, Tier};
use super::keywords::{KeywordSet, Trust};
use super::message::NormalizedMessage;
use crate::config::{ExtractionConfig, ScoreWeights};
use std::ops::Range;

/// Per-factor contributions to a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub tier: f64,
    pub keywords: f64,
    pub format: f64,
    pub position: f64,
    pub subject: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.tier + self.keywords + self.format + self.position + self.subject
    }
}

/// Scores candidates from the text around them.
#[derive(Debug, Clone)]
pub struct ContextScorer {
    keywords: KeywordSet,
    weights: ScoreWeights,
    position_ratio: f64,
}

impl ContextScorer {
    pub fn new(keywords: KeywordSet, weights: ScoreWeights, position_ratio: f64) -> Self {
        Self {
            keywords,
            weights,
            position_ratio,
        }
    }

    /// Returns the candidate with its `score` filled in.
    pub fn score(&self, mut candidate: Candidate, msg: &NormalizedMessage) -> Candidate {
        candidate.score = self.breakdown(&candidate, msg).total();
        candidate
    }

    /// Computes each factor for `candidate` without consuming it.
    pub fn breakdown(&self, candidate: &Candidate, msg: &NormalizedMessage) -> ScoreBreakdown {
        let w = &self.weights;
        let content = msg.full_content();

        let tier = match candidate.tier {
            Tier::High => w.tier_high,
            Tier::Medium => w.tier_medium,
            Tier::Low => w.tier_low,
        };

        let keywords = self
            .keywords
            .hits(&candidate.context)
            .iter()
            .map(|k| match k.trust {
                Trust::High => w.keyword_high,
                Trust::Medium => w.keyword_medium,
                Trust::Low => w.keyword_low,
            })
            .sum();

        let format = match format_cue(content, candidate.span.clone()) {
            FormatCue::Isolated => w.isolated,
            FormatCue::Spaced => w.spaced,
            FormatCue::Attached => w.attached,
        };

        let total_chars = msg.char_len() as f64;
        let position = if (candidate.position as f64) < self.position_ratio * total_chars {
            w.near_top
        } else {
            0.0
        };

        let subject = if msg.subject.contains(candidate.code.as_str()) {
            w.in_subject
        } else {
            0.0
        };

        ScoreBreakdown {
            tier,
            keywords,
            format,
            position,
            subject,
        }
    }
}

impl Default for ContextScorer {
    fn default() -> Self {
        let config = ExtractionConfig::default();
        Self::new(KeywordSet::bilingual(), config.weights, config.position_ratio)
    }
}

/// Classifies the characters immediately around `span`.
///
/// A newline on either side wins; otherwise both sides must be whitespace
/// or the edge of the text to count as spaced.
pub fn format_cue(content: &str, span: Range<usize>) -> FormatCue {
    let before = content[..span.start].chars().next_back();
    let after = content[span.end..].chars().next();

    if before == Some('\n') || after == Some('\n') {
        FormatCue::Isolated
    } else if before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace) {
        FormatCue::Spaced
    } else {
        FormatCue::Attached
    }
}
