//! Test fixtures and message builders.
//!
//! Provides a builder for raw messages and the canned batches used across
//! the integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use otpscan::RawMessage;
use serde_json::{json, Value};

/// Timestamp every fixture is offset from.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

/// Builder for test messages.
///
/// # Example
///
/// ```no_run
/// let msg = TestMessageBuilder::new()
///     .with_subject("Your Comet verification code")
///     .with_body("Your verification code: 483920.")
///     .received_minutes_after(5)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TestMessageBuilder {
    id: String,
    subject: String,
    sender: String,
    body: String,
    received_at: DateTime<Utc>,
}

impl TestMessageBuilder {
    /// Creates a builder with an empty subject and body from "Comet".
    pub fn new() -> Self {
        Self {
            id: "msg-1".to_string(),
            subject: String::new(),
            sender: "Comet".to_string(),
            body: String::new(),
            received_at: base_time(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = sender.to_string();
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn received_minutes_after(mut self, minutes: i64) -> Self {
        self.received_at = base_time() + Duration::minutes(minutes);
        self
    }

    pub fn build(self) -> RawMessage {
        RawMessage::new(
            self.id,
            self.subject,
            self.sender,
            self.body,
            self.received_at,
        )
    }

    /// Capitalized REST-style JSON object.
    pub fn build_rest_json(self) -> Value {
        json!({
            "Id": self.id,
            "Subject": self.subject,
            "From": {"EmailAddress": {"Name": self.sender, "Address": "no-reply@comet.dev"}},
            "Body": {"ContentType": "HTML", "Content": self.body},
            "ReceivedDateTime": self.received_at.to_rfc3339(),
        })
    }

    /// camelCase Graph-style JSON object.
    pub fn build_graph_json(self) -> Value {
        json!({
            "id": self.id,
            "subject": self.subject,
            "from": {"emailAddress": {"name": self.sender, "address": "no-reply@comet.dev"}},
            "body": {"contentType": "html", "content": self.body},
            "receivedDateTime": self.received_at.to_rfc3339(),
        })
    }
}

impl Default for TestMessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One message with a plain verification code.
pub fn single_code_message() -> RawMessage {
    TestMessageBuilder::new()
        .with_subject("Your Comet verification code")
        .with_body("Your verification code: 483920. Expires in 10 minutes.")
        .build()
}

/// Five messages from one sender, each superseding the last.
pub fn correction_scenario() -> Vec<RawMessage> {
    let bodies = [
        "Your verification code for Comet is: 482913.",
        "Your verification code for Comet is: 570284.",
        "Correction: your verification code for Comet is: 639105.",
        "Correction: your verification code for Comet is: 724861.",
        "Your final verification code for Comet is: 680616",
    ];

    bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            TestMessageBuilder::new()
                .with_id(&format!("correction-{}", i + 1))
                .with_subject("Your Comet verification code")
                .with_body(body)
                .received_minutes_after(i as i64 * 2)
                .build()
        })
        .collect()
}

/// A typical HTML verification email with tracking noise.
pub fn html_verification_email() -> String {
    r#"<html><head><style>td { font-size: 14px } .x { width: 600px }</style>
<script>var tracking = "20240501";</script></head>
<body><!-- campaign 99887766 -->
<table><tr><td>Hi there,</td></tr>
<tr><td>Use the code below to sign in to Comet.</td></tr>
<tr><td><strong>739402</strong></td></tr>
<tr><td>This code expires in 15 minutes.</td></tr>
<tr><td>Comet Inc, 1600 Main St, Springfield 62704</td></tr></table></body></html>"#
        .to_string()
}
