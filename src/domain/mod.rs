//! Per-message business logic for verification code detection.
//!
//! Everything in here works on one message (or one candidate) at a time:
//! normalize the body, find tiered candidates, score them from context and
//! reject the ones that only look like codes. Batch-level work lives in
//! [`crate::extraction`].

pub mod candidate;
pub mod keywords;
pub mod message;
pub mod normalize;
pub mod patterns;
pub mod scoring;
pub mod validity;

pub use candidate::{Candidate, FormatCue, Tier};
pub use keywords::{Keyword, KeywordSet, Trust};
pub use message::{NormalizedMessage, RawMessage, UNKNOWN_SENDER};
pub use normalize::ContentNormalizer;
pub use patterns::{PatternMatcher, PatternSet, TierPattern, TieredMatcher};
pub use scoring::{ContextScorer, ScoreBreakdown};
pub use validity::{ContentEvidence, Rejection, ValidityFilter, Verdict};
