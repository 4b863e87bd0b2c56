//! Tiered candidate pattern matching.
//!
//! Three tiers of regexes run over a message's `full_content`:
//! - **high**: an explicit code keyword directly next to the digits
//! - **medium**: a verification-flavoured word within ~50 chars before them
//! - **low**: any standalone digit run
//!
//! All tiers always run; later stages decide what survives. Every pattern is
//! written for the `regex` crate, whose matching time is linear in the input,
//! so no pattern can backtrack catastrophically on hostile bodies.

use super::candidate::{Candidate, Tier};
use super::message::NormalizedMessage;
use crate::config::{CodeCharset, ExtractionConfig};
use crate::error::{ExtractorError, ExtractorResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::trace;

/// Trait for candidate-finding strategies.
pub trait PatternMatcher: Send + Sync {
    /// Finds unscored, tier-tagged candidates in a normalized message.
    fn find_candidates(&self, msg: &NormalizedMessage) -> Vec<Candidate>;

    /// Human-readable description for logs.
    fn description(&self) -> &str;
}

/// Built-in tables are `(description, regex)` pairs.
type PatternTable = &'static [(&'static str, &'static str)];

const HIGH_PATTERNS: PatternTable = &[
    (
        "keyword then code: \"verification code: 123456\", \"验证码是123456\"",
        r"(?i)(?:verification\s+code|verify\s+code|security\s+code|confirmation\s+code|authentication\s+code|log-?in\s+code|sign-?in\s+code|one[- ]?time\s+(?:code|password|passcode)|passcode|\bcode|\bpin|\botp|验证码|校验码|动态码|动态密码|密码|码)(?:\s+for\s+[^\s0-9:：]+)?\s*(?:is|是|为)?\s*[:：]?\s*([0-9]+)",
    ),
    (
        "entry prompt: \"Enter the following code: 123456\", \"请输入 123456\"",
        r"(?i)(?:\benter\b|\binput\b|\btype\b|请输入|输入)(?:\s+(?:the|this|your|following|below))*\s*(?:(?:verification|security|one-time)\s+)?(?:code|pin|验证码)?\s*[:：]?\s*([0-9]+)",
    ),
    (
        "code then keyword: \"123456 is your Comet verification code\"",
        r"(?i)([0-9]+)\s*(?:is\s+your|is\s+the|为您的|是您的|为你的)\s*(?:[^\s0-9]+\s+){0,3}?(?:code|验证码|pin|otp|passcode|password)",
    ),
    (
        "bracketed at line start: \"[123456]\"",
        r"(?m)^[ \t]*[\[【]([0-9]+)[\]】]",
    ),
    (
        "labelled line: \"Verification: 123456\"",
        r"(?im)^[ \t]*verification\s*[:：]\s*([0-9]+)",
    ),
];

const MEDIUM_PATTERNS: PatternTable = &[(
    "verification word within 50 chars before the code",
    r"(?i)(?:verif\w*|confirm\w*|activat\w*|secur\w*|\baccess|log\s*in|sign\s*in|authenticat\w*|\botp\b|one[- ]?time|temporary|激活|确认|安全|登录|一次性|临时)[^0-9]{0,50}?([0-9]+)",
)];

const LOW_PATTERNS: PatternTable = &[("standalone digit run", r"\b[0-9]+\b")];

/// Alphanumeric codes are only trusted right after a strong keyword.
const ALPHANUMERIC_HIGH_PATTERNS: PatternTable = &[(
    "keyword then uppercase alphanumeric code",
    r"(?i:verification\s+code|security\s+code|your\s+code\s+is|\bcode|验证码)\s*(?i:is|是|为)?\s*[:：]?\s*([A-Z0-9]+)\b",
)];

static BILINGUAL: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::from_described(&tiered(&[
        (Tier::High, HIGH_PATTERNS),
        (Tier::Medium, MEDIUM_PATTERNS),
        (Tier::Low, LOW_PATTERNS),
    ]))
    .expect("Valid built-in pattern table")
});

static ALPHANUMERIC: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::from_described(&tiered(&[
        (Tier::High, HIGH_PATTERNS),
        (Tier::High, ALPHANUMERIC_HIGH_PATTERNS),
        (Tier::Medium, MEDIUM_PATTERNS),
        (Tier::Low, LOW_PATTERNS),
    ]))
    .expect("Valid built-in alphanumeric pattern table")
});

fn tiered(groups: &[(Tier, PatternTable)]) -> Vec<(Tier, &'static str, &'static str)> {
    groups
        .iter()
        .flat_map(|(tier, table)| table.iter().map(move |(desc, src)| (*tier, *desc, *src)))
        .collect()
}

/// One compiled pattern and the tier it reports.
#[derive(Debug, Clone)]
pub struct TierPattern {
    pub tier: Tier,
    /// Human-readable summary for logs and diagnostics
    pub description: String,
    pub regex: Regex,
}

/// An ordered, immutable table of tiered patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<TierPattern>,
}

impl PatternSet {
    /// Compiles a custom table, using each regex source as its description.
    pub fn from_sources(sources: &[(Tier, &str)]) -> ExtractorResult<Self> {
        let described: Vec<(Tier, &str, &str)> = sources
            .iter()
            .map(|(tier, source)| (*tier, *source, *source))
            .collect();
        Self::from_described(&described)
    }

    /// Compiles a custom table of `(tier, description, regex)` entries.
    /// Patterns are kept in high → medium → low order, preserving the given
    /// order within a tier.
    pub fn from_described(entries: &[(Tier, &str, &str)]) -> ExtractorResult<Self> {
        let mut patterns = entries
            .iter()
            .map(|(tier, description, source)| {
                Regex::new(source)
                    .map(|regex| TierPattern {
                        tier: *tier,
                        description: description.to_string(),
                        regex,
                    })
                    .map_err(|e| ExtractorError::Pattern {
                        pattern: source.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<ExtractorResult<Vec<_>>>()?;
        patterns.sort_by(|a, b| b.tier.cmp(&a.tier));
        Ok(Self { patterns })
    }

    /// The built-in English/Chinese digit-code table.
    pub fn bilingual() -> Self {
        BILINGUAL.clone()
    }

    /// The built-in table for the given charset.
    pub fn for_charset(charset: CodeCharset) -> Self {
        match charset {
            CodeCharset::Numeric => BILINGUAL.clone(),
            CodeCharset::Alphanumeric => ALPHANUMERIC.clone(),
        }
    }

    pub fn patterns(&self) -> &[TierPattern] {
        &self.patterns
    }
}

/// The default matcher: runs every pattern of a [`PatternSet`].
#[derive(Debug, Clone)]
pub struct TieredMatcher {
    patterns: PatternSet,
    context_window: usize,
    charset: CodeCharset,
}

impl TieredMatcher {
    pub fn new(patterns: PatternSet, context_window: usize, charset: CodeCharset) -> Self {
        Self {
            patterns,
            context_window,
            charset,
        }
    }
}

impl Default for TieredMatcher {
    fn default() -> Self {
        let config = ExtractionConfig::default();
        Self::new(
            PatternSet::for_charset(config.charset),
            config.context_window,
            config.charset,
        )
    }
}

impl PatternMatcher for TieredMatcher {
    fn find_candidates(&self, msg: &NormalizedMessage) -> Vec<Candidate> {
        let content = msg.full_content();
        let mut seen: HashSet<(Tier, usize)> = HashSet::new();
        let mut candidates = Vec::new();

        for pattern in self.patterns.patterns() {
            let before = candidates.len();
            for caps in pattern.regex.captures_iter(content) {
                // Group 1 when the pattern has one, else the whole match.
                let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                if !seen.insert((pattern.tier, m.start())) {
                    continue;
                }
                if let Some(candidate) = Candidate::new(
                    msg,
                    m.range(),
                    pattern.tier,
                    self.context_window,
                    self.charset,
                ) {
                    candidates.push(candidate);
                }
            }
            if candidates.len() > before {
                trace!(
                    message_id = %msg.message_id,
                    pattern = %pattern.description,
                    hits = candidates.len() - before,
                    "Pattern matched"
                );
            }
        }

        candidates
    }

    fn description(&self) -> &str {
        "tiered bilingual code patterns"
    }
}
