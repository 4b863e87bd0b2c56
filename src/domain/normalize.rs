//! HTML-to-text normalization for message bodies.
//!
//! Produces the plain text that pattern matching runs over. Block-level
//! tags and `<br>` become newlines so that a code sitting alone on a line
//! can still be recognised as isolated after stripping.

use super::message::{NormalizedMessage, RawMessage};
use crate::config::ExtractionConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Stateless HTML normalizer.
#[derive(Debug, Clone)]
pub struct ContentNormalizer {
    max_body_chars: usize,
}

impl ContentNormalizer {
    /// Creates a normalizer that truncates clean bodies at `max_body_chars`.
    pub fn new(max_body_chars: usize) -> Self {
        Self { max_body_chars }
    }

    /// Builds the ephemeral [`NormalizedMessage`] for one raw message.
    pub fn normalize(&self, raw: &RawMessage) -> NormalizedMessage {
        let mut clean_body = Self::clean_text(&raw.body);
        if let Some((cut, _)) = clean_body.char_indices().nth(self.max_body_chars) {
            debug!(
                message_id = %raw.message_id,
                limit = self.max_body_chars,
                "Truncating oversized message body"
            );
            clean_body.truncate(cut);
        }

        NormalizedMessage::new(
            raw.message_id.clone(),
            raw.subject.clone(),
            raw.sender.clone(),
            raw.received_at,
            clean_body,
        )
    }

    /// Strips markup from `html` and collapses whitespace.
    ///
    /// Order matters: script/style blocks and comments go first so their
    /// contents never reach the tag stripper.
    pub fn clean_text(html: &str) -> String {
        let text = Self::script_style().replace_all(html, " ");
        let text = Self::comment().replace_all(&text, " ");
        let text = Self::block_tag().replace_all(&text, "\n");
        let text = Self::line_break().replace_all(&text, "\n");
        let text = Self::any_tag().replace_all(&text, "");
        let text = decode_entities(&text);
        let text = remove_zero_width(&text);
        collapse_whitespace(&text)
    }

    fn script_style() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
                .expect("Valid script/style regex")
        });
        &PATTERN
    }

    fn comment() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Valid comment regex"));
        &PATTERN
    }

    fn block_tag() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)</?(?:td|th|tr|table|div|p|li|ul|ol|h[1-6]|blockquote|center)\b[^>]*>")
                .expect("Valid block tag regex")
        });
        &PATTERN
    }

    fn line_break() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("Valid line break regex"));
        &PATTERN
    }

    fn any_tag() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"<[^>]*>").expect("Valid tag regex"));
        &PATTERN
    }
}

impl Default for ContentNormalizer {
    fn default() -> Self {
        Self::new(ExtractionConfig::default().max_body_chars)
    }
}

/// Decodes the handful of entities that show up in mail bodies, plus
/// numeric references.
pub fn decode_entities(text: &str) -> String {
    static NUMERIC: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("Valid entity regex"));

    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");

    let numeric = NUMERIC.replace_all(&named, |caps: &regex::Captures<'_>| {
        let value = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        match value.and_then(char::from_u32) {
            Some('\u{a0}') => " ".to_string(),
            Some(c) => c.to_string(),
            None => String::new(),
        }
    });

    // Last, so "&amp;lt;" decodes to "&lt;" rather than "<".
    numeric.replace("&amp;", "&")
}

/// Removes zero-width characters that mail templates use to defeat scraping.
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}'))
        .collect()
}

/// Collapses whitespace runs: a run containing a newline becomes one `\n`,
/// any other run becomes one space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<char> = None;

    for c in text.chars() {
        if c.is_whitespace() {
            let this = if c == '\n' || c == '\r' { '\n' } else { ' ' };
            pending = match pending {
                Some('\n') => Some('\n'),
                _ => Some(this),
            };
            continue;
        }
        if let Some(ws) = pending.take() {
            if !out.is_empty() {
                out.push(ws);
            }
        }
        out.push(c);
    }

    out
}
