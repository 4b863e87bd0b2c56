//! Bilingual (English/Chinese) verification keyword tables.
//!
//! Keywords are data, not code: a [`KeywordSet`] is built from a list of
//! `(text, trust)` entries, so alternative sets can coexist and be tested on
//! their own. Lookup uses a single Aho-Corasick automaton over all entries.

use crate::error::{ExtractorError, ExtractorResult};
use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// How strongly a keyword signals that nearby digits are a verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trust {
    Low,
    Medium,
    High,
}

/// One keyword entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    pub trust: Trust,
}

impl Keyword {
    pub fn new(text: impl Into<String>, trust: Trust) -> Self {
        Self {
            text: text.into(),
            trust,
        }
    }

    /// ASCII keywords only count at word boundaries; CJK ones count anywhere.
    fn needs_word_boundary(&self) -> bool {
        self.text.is_ascii()
    }
}

const HIGH_TRUST: &[&str] = &[
    "verification code",
    "verify code",
    "security code",
    "confirmation code",
    "authentication code",
    "login code",
    "sign-in code",
    "one-time code",
    "one time code",
    "one-time password",
    "your code is",
    "enter this code",
    "use this code",
    "验证码",
    "您的验证码是",
    "校验码",
    "动态码",
    "动态密码",
];

const MEDIUM_TRUST: &[&str] = &[
    "verify",
    "verification",
    "confirm",
    "activate",
    "activation",
    "security",
    "secure",
    "access",
    "login",
    "log in",
    "sign in",
    "otp",
    "2fa",
    "authenticate",
    "authentication",
    "确认",
    "激活",
    "安全",
    "登录",
    "一次性",
];

const LOW_TRUST: &[&str] = &[
    "code",
    "pin",
    "number",
    "temporary",
    "passcode",
    "password",
    "码",
    "密码",
    "临时",
    "号码",
];

static BILINGUAL: Lazy<KeywordSet> = Lazy::new(|| {
    let keywords = [
        (HIGH_TRUST, Trust::High),
        (MEDIUM_TRUST, Trust::Medium),
        (LOW_TRUST, Trust::Low),
    ]
    .iter()
    .flat_map(|(list, trust)| list.iter().map(move |k| Keyword::new(*k, *trust)))
    .collect();
    KeywordSet::new(keywords).expect("Valid built-in keyword table")
});

/// A compiled keyword table.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
    automaton: AhoCorasick,
}

impl KeywordSet {
    /// Compiles a keyword table. Matching is ASCII case-insensitive.
    pub fn new(keywords: Vec<Keyword>) -> ExtractorResult<Self> {
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(keywords.iter().map(|k| k.text.as_str()))
            .map_err(|e| ExtractorError::Pattern {
                pattern: "<keyword table>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            keywords,
            automaton,
        })
    }

    /// The built-in English/Chinese table.
    pub fn bilingual() -> Self {
        BILINGUAL.clone()
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Distinct keywords occurring in `text`, in order of first occurrence.
    pub fn hits<'a>(&'a self, text: &str) -> Vec<&'a Keyword> {
        let mut seen = vec![false; self.keywords.len()];
        let mut hits = Vec::new();

        for m in self.automaton.find_overlapping_iter(text) {
            let idx = m.pattern().as_usize();
            if seen[idx] {
                continue;
            }
            let keyword = &self.keywords[idx];
            if keyword.needs_word_boundary() && !at_word_boundary(text, m.start(), m.end()) {
                continue;
            }
            seen[idx] = true;
            hits.push(keyword);
        }

        hits
    }

    /// Strongest trust level of any keyword in `text`.
    pub fn strongest(&self, text: &str) -> Option<Trust> {
        self.hits(text).iter().map(|k| k.trust).max()
    }

    pub fn contains_any(&self, text: &str) -> bool {
        !self.hits(text).is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::bilingual()
    }
}

fn at_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphanumeric())
        && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}
