//! Message records at the engine boundary.
//!
//! Upstream mail APIs disagree on field spelling (`Subject` vs `subject`,
//! `From.EmailAddress.Name` vs `from.emailAddress.name`, ...). All of that is
//! resolved once, here, so nothing downstream ever looks at JSON.

use crate::error::{ExtractorError, ExtractorResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sender used when a message carries neither a display name nor an address.
pub const UNKNOWN_SENDER: &str = "unknown";

/// A message as supplied by the caller. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub subject: String,
    #[serde(default = "unknown_sender")]
    pub sender: String,
    /// Body content, possibly HTML
    #[serde(default)]
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub message_id: String,
}

fn unknown_sender() -> String {
    UNKNOWN_SENDER.to_string()
}

impl RawMessage {
    pub fn new(
        message_id: impl Into<String>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        body: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        let sender = sender.into();
        Self {
            subject: subject.into(),
            sender: if sender.trim().is_empty() {
                unknown_sender()
            } else {
                sender
            },
            body: body.into(),
            received_at,
            message_id: message_id.into(),
        }
    }

    /// Adapts a message object in either the REST (`Subject`, `Body.Content`)
    /// or Graph (`subject`, `body.content`) spelling.
    ///
    /// Missing subject becomes empty and missing sender becomes
    /// [`UNKNOWN_SENDER`]. Missing id, body or timestamp is an error.
    pub fn from_json(value: &Value) -> ExtractorResult<Self> {
        if !value.is_object() {
            return Err(ExtractorError::malformed(
                "<none>",
                "message is not a JSON object",
            ));
        }

        let message_id = string_field(value, &[&["Id"], &["id"], &["messageId"], &["message_id"]])
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ExtractorError::malformed("<none>", "missing message id"))?;

        let body = string_field(
            value,
            &[
                &["Body", "Content"],
                &["body", "content"],
                &["Body", "Preview"],
                &["body", "preview"],
                &["BodyPreview"],
                &["bodyPreview"],
                &["body"],
            ],
        )
        .ok_or_else(|| ExtractorError::malformed(&message_id, "missing body"))?;

        let received_raw = string_field(
            value,
            &[
                &["ReceivedDateTime"],
                &["receivedDateTime"],
                &["received_at"],
                &["receivedAt"],
            ],
        )
        .ok_or_else(|| ExtractorError::malformed(&message_id, "missing received timestamp"))?;
        let received_at = parse_timestamp(&received_raw).ok_or_else(|| {
            ExtractorError::malformed(
                &message_id,
                format!("unparseable received timestamp '{}'", received_raw),
            )
        })?;

        let subject = string_field(value, &[&["Subject"], &["subject"]]).unwrap_or_default();

        let sender = string_field(
            value,
            &[
                &["From", "EmailAddress", "Name"],
                &["from", "emailAddress", "name"],
                &["From", "EmailAddress", "Address"],
                &["from", "emailAddress", "address"],
                &["From"],
                &["from"],
                &["Sender"],
                &["sender"],
            ],
        )
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(unknown_sender);

        Ok(Self {
            subject,
            sender,
            body,
            received_at,
            message_id,
        })
    }
}

/// Returns the first path that resolves to a string.
fn string_field(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| {
        let mut node = value;
        for key in *path {
            node = node.get(key)?;
        }
        node.as_str().map(str::to_string)
    })
}

/// Accepts RFC 3339, or a zone-less timestamp interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// A message after HTML stripping, local to one extraction call.
///
/// Keeps the char start of every position in `full_content`, so byte spans
/// found by the matchers map to char offsets without rescanning the text.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMessage {
    pub subject: String,
    pub sender: String,
    pub received_at: DateTime<Utc>,
    pub message_id: String,
    pub clean_body: String,
    full_content: String,
    char_starts: Vec<usize>,
}

impl NormalizedMessage {
    pub fn new(
        message_id: impl Into<String>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        received_at: DateTime<Utc>,
        clean_body: impl Into<String>,
    ) -> Self {
        let subject = subject.into();
        let clean_body = clean_body.into();
        let full_content = format!("{} {}", subject, clean_body);
        let char_starts = full_content.char_indices().map(|(i, _)| i).collect();

        Self {
            subject,
            sender: sender.into(),
            received_at,
            message_id: message_id.into(),
            clean_body,
            full_content,
            char_starts,
        }
    }

    /// `subject + " " + clean_body`; the text every pattern scans.
    pub fn full_content(&self) -> &str {
        &self.full_content
    }

    /// Length of `full_content` in chars.
    pub fn char_len(&self) -> usize {
        self.char_starts.len()
    }

    /// Char offset of byte offset `byte` within `full_content`.
    pub fn char_position(&self, byte: usize) -> usize {
        self.char_starts.partition_point(|&start| start < byte)
    }
}
