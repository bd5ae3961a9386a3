//! Shared types for the import pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Raw message ─────────────────────────────────────────────────────

/// A mailbox message as handed over by the mail provider collaborator.
///
/// Immutable input. The provider owns fetching, pagination, and token
/// refresh; the pipeline only ever reads these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// Provider message id, unique within one mailbox.
    pub provider_id: String,
    /// Sender email address.
    pub sender_address: String,
    /// Sender display name, when the provider exposes one.
    pub sender_name: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Message body, plain text.
    pub body: String,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
    /// Provider thread id, when available.
    pub thread_id: Option<String>,
}

// ── Normalized message ──────────────────────────────────────────────

/// A message after normalization — built once per `RawMessage`, never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct NormalizedMessage {
    /// The original provider message.
    pub raw: RawMessage,
    /// Body with HTML tags and quoted-reply boilerplate stripped,
    /// original case preserved (field extraction relies on capitalization).
    pub body_clean: String,
    /// Lowercase subject.
    pub subject_lower: String,
    /// Lowercase cleaned body.
    pub body_lower: String,
    /// Local part of the sender address, lowercase.
    pub sender_local: String,
    /// Domain of the sender address, lowercase.
    pub sender_domain: String,
    /// Local part matches a no-reply/automation pattern.
    pub is_automated_sender: bool,
}

// ── Classification ──────────────────────────────────────────────────

/// The kind of job-application event a message represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A confirmation that an application was submitted.
    NewApplication,
    /// The application was turned down.
    Rejected,
    /// The counterparty wants to schedule an interview.
    InterviewRequested,
    /// An offer was extended.
    Offered,
    /// Not a job-application event.
    Unrelated,
}

impl EventType {
    /// Short label for logging and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NewApplication => "new_application",
            Self::Rejected => "rejected",
            Self::InterviewRequested => "interview_requested",
            Self::Offered => "offered",
            Self::Unrelated => "unrelated",
        }
    }

    /// Whether this event is a response to an existing application.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::InterviewRequested | Self::Offered
        )
    }
}

/// Outcome of classifying one message.
///
/// `rule` names the tier that matched, so every ledger entry and report row
/// can be traced back to the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub event: EventType,
    pub confidence: f32,
    pub rule: &'static str,
}

/// Company and position recovered from a message, when extraction succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub company: Option<String>,
    pub position: Option<String>,
}
