//! Application and contact records.
//!
//! Records are mutated only through the scan orchestrator's atomic commits;
//! the engine never deletes them.

pub mod resolve;
pub mod state_machine;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Application ─────────────────────────────────────────────────────

/// Lifecycle status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Interviewing,
    Offered,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// Terminal statuses are never auto-transitioned out of.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Withdrawn)
    }

    /// Short label for logging and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Interviewing => "interviewing",
            Self::Offered => "offered",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

/// Where a record or status change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// User-entered or user-edited.
    Manual,
    /// Produced by the import engine.
    Imported,
}

/// A tracked job application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    /// Owning user id.
    pub owner: String,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    /// How the record itself was created.
    pub source: RecordSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When the status last changed. Compared against message timestamps
    /// for the manual-override flag.
    pub status_changed_at: DateTime<Utc>,
    /// Who made the last status change.
    pub status_source: RecordSource,
}

impl Application {
    /// Create an imported application in the initial `Applied` status.
    pub fn imported(
        owner: impl Into<String>,
        company: impl Into<String>,
        position: impl Into<String>,
        applied_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            company: company.into(),
            position: position.into(),
            status: ApplicationStatus::Applied,
            source: RecordSource::Imported,
            created_at: now,
            updated_at: now,
            status_changed_at: applied_at,
            status_source: RecordSource::Imported,
        }
    }

    /// Dedup identity: (normalized company, normalized position).
    /// The owner completes the key; stores partition by owner already.
    pub fn identity_key(&self) -> (String, String) {
        (
            normalize_company(&self.company),
            normalize_position(&self.position),
        )
    }
}

// ── Contact ─────────────────────────────────────────────────────────

/// A counterparty contact derived from a personal response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub email: String,
    pub company: String,
    /// The application this contact was first seen on.
    pub application_id: Uuid,
    pub first_seen: DateTime<Utc>,
    pub last_contacted: DateTime<Utc>,
}

// ── Identity normalization ──────────────────────────────────────────

static CORP_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:,\s*)?\b(inc|llc|ltd|corp|corporation|company|co)\.?\s*$").unwrap()
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a company name for identity comparison: lowercase, collapsed
/// whitespace, corporate suffixes and a leading "the" stripped.
pub fn normalize_company(name: &str) -> String {
    let mut normalized = WHITESPACE
        .replace_all(name.trim(), " ")
        .to_lowercase();
    loop {
        let stripped = CORP_SUFFIX.replace(&normalized, "").trim().to_string();
        if stripped == normalized {
            break;
        }
        normalized = stripped;
    }
    normalized = normalized
        .strip_prefix("the ")
        .unwrap_or(&normalized)
        .to_string();
    normalized
        .trim_matches(|c: char| c.is_whitespace() || ".,!?:;-".contains(c))
        .to_string()
}

/// Normalize a position title for identity comparison.
pub fn normalize_position(position: &str) -> String {
    WHITESPACE
        .replace_all(position.trim(), " ")
        .to_lowercase()
        .trim_matches(|c: char| c.is_whitespace() || ".,!?:;-".contains(c))
        .to_string()
}
