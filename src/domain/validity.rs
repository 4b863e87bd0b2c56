//! Rejection rules for candidates that look like codes but are not.
//!
//! Rules run in a fixed order and stop at the first hit:
//! 1. shape (4–8 chars)
//! 2. structural deny-list (repeats, sequences, years, ZIP codes, service
//!    numbers, phone numbers, reference/order ids)
//! 3. no verification keyword anywhere in the message
//! 4. only weak keywords in the message and the candidate came from the low tier

use super::candidate::{is_code_shape, Candidate, Tier};
use super::keywords::{KeywordSet, Trust};
use crate::config::{CodeCharset, ExtractionConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

/// Chars before a candidate inspected for a reference/order prefix.
const REFERENCE_LOOKBEHIND: usize = 24;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    InvalidLength,
    RepeatedDigits,
    SequentialDigits,
    Year,
    ZipCode,
    ServiceNumber,
    PhoneNumber,
    ReferenceNumber,
    NoVerificationContext,
    InsufficientContext,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::InvalidLength => "Invalid length",
            Self::RepeatedDigits => "Repeated digits",
            Self::SequentialDigits => "Sequential digits",
            Self::Year => "Looks like a year",
            Self::ZipCode => "Looks like a ZIP code",
            Self::ServiceNumber => "Toll-free or service number",
            Self::PhoneNumber => "Part of a phone number",
            Self::ReferenceNumber => "Reference or order number",
            Self::NoVerificationContext => "No verification context found",
            Self::InsufficientContext => "Insufficient verification context",
        };
        f.write_str(reason)
    }
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> String {
        match self {
            Self::Valid => "Valid verification code".to_string(),
            Self::Rejected(rejection) => rejection.to_string(),
        }
    }
}

/// Message-wide facts shared by every candidate of one message.
#[derive(Debug, Clone)]
pub struct ContentEvidence<'a> {
    content: &'a str,
    strongest: Option<Trust>,
    /// Phone number matches, in order and non-overlapping
    phone_spans: Vec<Range<usize>>,
}

impl ContentEvidence<'_> {
    /// Strongest keyword trust anywhere in the message.
    pub fn strongest(&self) -> Option<Trust> {
        self.strongest
    }

    fn overlaps_phone(&self, span: &Range<usize>) -> bool {
        let first = self.phone_spans.partition_point(|p| p.end <= span.start);
        self.phone_spans
            .get(first)
            .is_some_and(|p| p.start < span.end)
    }
}

/// Applies the rejection rules.
#[derive(Debug, Clone)]
pub struct ValidityFilter {
    keywords: KeywordSet,
    min_year: u16,
    max_year: u16,
    reject_zip_shape: bool,
    charset: CodeCharset,
}

impl ValidityFilter {
    pub fn new(keywords: KeywordSet, config: &ExtractionConfig) -> Self {
        Self {
            keywords,
            min_year: config.min_year,
            max_year: config.max_year,
            reject_zip_shape: config.reject_zip_shape,
            charset: config.charset,
        }
    }

    /// Collects the message-wide facts the rules need. Build once per
    /// message and reuse it for every candidate in that message.
    pub fn evidence<'a>(&self, content: &'a str) -> ContentEvidence<'a> {
        ContentEvidence {
            content,
            strongest: self.keywords.strongest(content),
            phone_spans: phone_number().find_iter(content).map(|m| m.range()).collect(),
        }
    }

    /// Runs every rule against `candidate`.
    pub fn check(&self, candidate: &Candidate, evidence: &ContentEvidence<'_>) -> Verdict {
        if let Some(rejection) = self.check_structure(&candidate.code) {
            return Verdict::Rejected(rejection);
        }
        if let Some(rejection) = check_surroundings(evidence, candidate.span.clone()) {
            return Verdict::Rejected(rejection);
        }

        match evidence.strongest {
            None => Verdict::Rejected(Rejection::NoVerificationContext),
            Some(Trust::Low) if candidate.tier == Tier::Low => {
                Verdict::Rejected(Rejection::InsufficientContext)
            }
            Some(_) => Verdict::Valid,
        }
    }

    /// Rules that depend on the code string alone.
    pub fn check_structure(&self, code: &str) -> Option<Rejection> {
        if !is_code_shape(code, self.charset) {
            return Some(Rejection::InvalidLength);
        }
        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        if is_repeated(code) {
            Some(Rejection::RepeatedDigits)
        } else if is_sequence(code) {
            Some(Rejection::SequentialDigits)
        } else if self.is_year(code) {
            Some(Rejection::Year)
        } else if self.reject_zip_shape && code.len() == 5 {
            Some(Rejection::ZipCode)
        } else if service_number().is_match(code) {
            Some(Rejection::ServiceNumber)
        } else {
            None
        }
    }

    fn is_year(&self, code: &str) -> bool {
        code.len() == 4
            && code
                .parse::<u16>()
                .is_ok_and(|y| (self.min_year..=self.max_year).contains(&y))
    }
}

impl Default for ValidityFilter {
    fn default() -> Self {
        Self::new(KeywordSet::bilingual(), &ExtractionConfig::default())
    }
}

fn is_repeated(code: &str) -> bool {
    let first = code.as_bytes()[0];
    code.bytes().all(|b| b == first)
}

fn is_sequence(code: &str) -> bool {
    "0123456789".contains(code) || "9876543210".contains(code)
}

fn service_number() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:800|888|877|866|855|844|833|900|555)[0-9]{4}$")
            .expect("Valid service number regex")
    });
    &PATTERN
}

fn phone_number() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}")
            .expect("Valid phone number regex")
    });
    &PATTERN
}

fn reference_prefix() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)(?:\bref(?:erence)?|\border|\binvoice|\bticket|\bcase|\baccount|\bacct|\btransaction|\btracking|订单|发票|单号)\s*(?:no\.?|number|num|id)?\s*[:：#]?\s*$",
        )
        .expect("Valid reference prefix regex")
    });
    &PATTERN
}

/// Rules that depend on where the code sits in the message.
fn check_surroundings(evidence: &ContentEvidence<'_>, span: Range<usize>) -> Option<Rejection> {
    if evidence.overlaps_phone(&span) {
        return Some(Rejection::PhoneNumber);
    }

    let content = evidence.content;
    let lookbehind_start = content[..span.start]
        .char_indices()
        .rev()
        .nth(REFERENCE_LOOKBEHIND - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    if reference_prefix().is_match(&content[lookbehind_start..span.start]) {
        return Some(Rejection::ReferenceNumber);
    }

    None
}
