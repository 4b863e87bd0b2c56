//! Batch extraction service.
//!
//! [`ExtractionService`] is the only component that sees a whole batch. It
//! drives normalize → match → score → filter over each message and then
//! ranks the accepted codes together. It holds no mutable state, performs no
//! I/O and can be shared between threads freely.

pub mod ranking;
pub mod report;

pub use ranking::{rank_and_dedupe, RankedResult};
pub use report::{CandidateReport, ExtractionSummary, MessageAnalysis};

use crate::config::ExtractionConfig;
use crate::domain::{
    Candidate, ContentNormalizer, ContextScorer, KeywordSet, NormalizedMessage, PatternMatcher,
    PatternSet, RawMessage, ScoreBreakdown, TieredMatcher, ValidityFilter, Verdict,
};
use crate::error::{ExtractorError, ExtractorResult};
use serde_json::Value;
use tracing::{debug, warn};

/// Extraction service coordinating the per-message pipeline.
pub struct ExtractionService {
    config: ExtractionConfig,
    normalizer: ContentNormalizer,
    matcher: Box<dyn PatternMatcher>,
    scorer: ContextScorer,
    filter: ValidityFilter,
}

impl ExtractionService {
    /// Creates a service with the built-in bilingual tables.
    pub fn new(config: ExtractionConfig) -> ExtractorResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: ExtractionConfig) -> Self {
        let keywords = KeywordSet::bilingual();
        Self {
            normalizer: ContentNormalizer::new(config.max_body_chars),
            matcher: Box::new(TieredMatcher::new(
                PatternSet::for_charset(config.charset),
                config.context_window,
                config.charset,
            )),
            scorer: ContextScorer::new(
                keywords.clone(),
                config.weights.clone(),
                config.position_ratio,
            ),
            filter: ValidityFilter::new(keywords, &config),
            config,
        }
    }

    /// Replaces the candidate matcher.
    pub fn with_matcher(mut self, matcher: Box<dyn PatternMatcher>) -> Self {
        debug!(matcher = matcher.description(), "Using custom candidate matcher");
        self.matcher = matcher;
        self
    }

    /// Replaces the keyword table used by both scoring and filtering.
    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.scorer = ContextScorer::new(
            keywords.clone(),
            self.config.weights.clone(),
            self.config.position_ratio,
        );
        self.filter = ValidityFilter::new(keywords, &self.config);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts, deduplicates and ranks codes from a batch of messages.
    ///
    /// Messages without an id are skipped with a warning. An empty result
    /// means no code was found.
    pub fn extract(&self, messages: &[RawMessage]) -> Vec<RankedResult> {
        self.extract_with_summary(messages).0
    }

    /// Like [`extract`](Self::extract), also returning batch counters.
    pub fn extract_with_summary(
        &self,
        messages: &[RawMessage],
    ) -> (Vec<RankedResult>, ExtractionSummary) {
        let mut summary = ExtractionSummary {
            messages: messages.len(),
            ..Default::default()
        };
        let mut accepted = Vec::new();

        for message in messages {
            if message.message_id.trim().is_empty() {
                warn!(sender = %message.sender, "Skipping message without an id");
                summary.skipped += 1;
                continue;
            }

            let normalized = self.normalizer.normalize(message);
            for (candidate, _, verdict) in self.evaluate(&normalized) {
                summary.candidates += 1;
                if verdict.is_valid() {
                    accepted.push(to_result(candidate, &normalized));
                }
            }
        }

        summary.accepted = accepted.len();
        let ranked = rank_and_dedupe(accepted, self.config.dedup, self.config.tie_epsilon);
        summary.results = ranked.len();

        debug!(
            messages = summary.messages,
            skipped = summary.skipped,
            candidates = summary.candidates,
            accepted = summary.accepted,
            results = summary.results,
            "Extraction batch complete"
        );

        (ranked, summary)
    }

    /// Extracts from a JSON array of message objects in either upstream
    /// spelling.
    ///
    /// Malformed elements are skipped with a warning. The only error is a
    /// `value` that is not an array.
    pub fn extract_json(&self, value: &Value) -> ExtractorResult<Vec<RankedResult>> {
        let items = value.as_array().ok_or_else(|| ExtractorError::InvalidInput {
            parameter: "messages".to_string(),
            reason: "expected a JSON array of message objects".to_string(),
        })?;
        Ok(self.extract(&adapt_messages(items)))
    }

    /// The single most plausible, most recent code, if any.
    pub fn latest_code(&self, messages: &[RawMessage]) -> Option<RankedResult> {
        self.extract(messages).into_iter().next()
    }

    /// Reports every candidate in one message with its score and verdict.
    pub fn analyze(&self, message: &RawMessage) -> MessageAnalysis {
        let normalized = self.normalizer.normalize(message);
        let candidates = self
            .evaluate(&normalized)
            .into_iter()
            .map(|(candidate, breakdown, verdict)| CandidateReport {
                code: candidate.code,
                tier: candidate.tier,
                position: candidate.position,
                score: candidate.score,
                breakdown,
                verdict,
            })
            .collect();

        MessageAnalysis {
            message_id: message.message_id.clone(),
            sender: message.sender.clone(),
            candidates,
        }
    }

    fn evaluate(&self, msg: &NormalizedMessage) -> Vec<(Candidate, ScoreBreakdown, Verdict)> {
        let evidence = self.filter.evidence(msg.full_content());
        self.matcher
            .find_candidates(msg)
            .into_iter()
            .map(|candidate| {
                let breakdown = self.scorer.breakdown(&candidate, msg);
                let candidate = Candidate {
                    score: breakdown.total(),
                    ..candidate
                };
                let verdict = self.filter.check(&candidate, &evidence);
                if let Verdict::Rejected(reason) = verdict {
                    debug!(
                        message_id = %msg.message_id,
                        code = %candidate.code,
                        tier = %candidate.tier,
                        %reason,
                        "Rejected candidate"
                    );
                }
                (candidate, breakdown, verdict)
            })
            .collect()
    }
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::assemble(ExtractionConfig::default())
    }
}

/// Adapts JSON message objects, logging and dropping the malformed ones.
pub fn adapt_messages(items: &[Value]) -> Vec<RawMessage> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match RawMessage::from_json(item) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed message");
                None
            }
        })
        .collect()
}

fn to_result(candidate: Candidate, msg: &NormalizedMessage) -> RankedResult {
    RankedResult {
        code: candidate.code,
        sender: msg.sender.clone(),
        subject: msg.subject.clone(),
        received_at: msg.received_at,
        score: candidate.score,
        priority: candidate.tier,
        message_id: msg.message_id.clone(),
    }
}
