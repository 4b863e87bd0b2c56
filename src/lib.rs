//! Verification code extraction and ranking for mailbox messages.
//!
//! Given a batch of raw (often HTML) messages, this library decides which of
//! them carry a one-time verification code, extracts it, and ranks the
//! candidates so the most plausible, most recent code comes first.
//!
//! # Features
//!
//! - **HTML Normalization**: Strips scripts, styles, comments and tags
//! - **Tiered Patterns**: High/medium/low confidence English and Chinese patterns
//! - **Context Scoring**: Keywords, layout and position around each candidate
//! - **False-Positive Rejection**: Years, ZIP codes, phone numbers, order ids, ...
//! - **Batch Ranking**: Deduplication by code and sender, recency tiebreak
//!
//! # Architecture
//!
//! - [`domain`]: Per-message logic (normalizer, matcher, scorer, filter)
//! - [`extraction`]: Batch service, deduplication and ranking
//! - [`config`]: Tuning knobs
//! - [`error`]: Error handling
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use otpscan::{ExtractionService, RawMessage};
//!
//! let service = ExtractionService::default();
//! let messages = vec![RawMessage::new(
//!     "AAMkAGI2",
//!     "Your Comet verification code",
//!     "Comet",
//!     "<p>Your verification code: <b>483920</b>. Expires in 10 minutes.</p>",
//!     Utc::now(),
//! )];
//!
//! let results = service.extract(&messages);
//! assert_eq!(results[0].code, "483920");
//! ```
//!
//! # Upstream JSON
//!
//! Both REST (`Subject`, `Body.Content`) and Graph (`subject`, `body.content`)
//! spellings are accepted:
//!
//! ```
//! use otpscan::ExtractionService;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let batch = json!([{
//!     "Id": "AAMk1",
//!     "Subject": "Sign in",
//!     "From": {"EmailAddress": {"Name": "Comet"}},
//!     "Body": {"Content": "您的验证码是 551208"},
//!     "ReceivedDateTime": "2024-05-01T10:00:00Z"
//! }]);
//!
//! let results = ExtractionService::default().extract_json(&batch)?;
//! assert_eq!(results[0].code, "551208");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod extraction;
pub mod logging;

pub use config::{CodeCharset, DedupMode, ExtractionConfig, ScoreWeights};
pub use domain::{Candidate, KeywordSet, PatternMatcher, PatternSet, RawMessage, Tier};
pub use error::{ExtractorError, ExtractorResult};
pub use extraction::{
    CandidateReport, ExtractionService, ExtractionSummary, MessageAnalysis, RankedResult,
};
