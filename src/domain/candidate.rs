//! Candidate codes and the tiers that produce them.

use super::message::NormalizedMessage;
use crate::config::CodeCharset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Confidence of the pattern that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How a candidate sits relative to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCue {
    /// A newline on at least one side
    Isolated,
    /// Whitespace (or the text edge) on both sides
    Spaced,
    /// Glued to punctuation or other characters
    Attached,
}

/// Minimum code length in characters.
pub const MIN_CODE_LEN: usize = 4;
/// Maximum code length in characters.
pub const MAX_CODE_LEN: usize = 8;

/// Returns true if `code` has a legal shape for `charset`.
///
/// Numeric: 4–8 ASCII digits. Alphanumeric: 4–8 ASCII uppercase letters or
/// digits with at least one of each (all-digit codes stay on the numeric path).
pub fn is_code_shape(code: &str, charset: CodeCharset) -> bool {
    if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len()) {
        return false;
    }
    let all_digits = code.bytes().all(|b| b.is_ascii_digit());
    match charset {
        CodeCharset::Numeric => all_digits,
        CodeCharset::Alphanumeric => {
            all_digits
                || (code
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
                    && code.bytes().any(|b| b.is_ascii_digit())
                    && code.bytes().any(|b| b.is_ascii_uppercase()))
        }
    }
}

/// A possible code found in one message's `full_content`.
///
/// Build through [`Candidate::new`], which refuses anything that is not a
/// legal code shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub code: String,
    pub tier: Tier,
    /// Character offset of the code within `full_content`
    pub position: usize,
    /// Byte range of the code within `full_content`
    pub span: Range<usize>,
    /// Text around the code, `context_window` chars on each side
    pub context: String,
    pub score: f64,
}

impl Candidate {
    /// Builds an unscored candidate from a byte span of `msg.full_content()`.
    pub fn new(
        msg: &NormalizedMessage,
        span: Range<usize>,
        tier: Tier,
        context_window: usize,
        charset: CodeCharset,
    ) -> Option<Self> {
        let content = msg.full_content();
        let code = content.get(span.clone())?;
        if !is_code_shape(code, charset) {
            return None;
        }

        let position = msg.char_position(span.start);
        let context = context_slice(content, span.clone(), context_window).to_string();

        Some(Self {
            code: code.to_string(),
            tier,
            position,
            span,
            context,
            score: 0.0,
        })
    }
}

/// Slice of `content` extending `window` chars either side of `span`.
pub fn context_slice(content: &str, span: Range<usize>, window: usize) -> &str {
    let start = match window {
        0 => span.start,
        n => content[..span.start]
            .char_indices()
            .rev()
            .nth(n - 1)
            .map(|(i, _)| i)
            .unwrap_or(0),
    };
    let end = content[span.end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| span.end + i)
        .unwrap_or(content.len());
    &content[start..end]
}
