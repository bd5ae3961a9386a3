//! Persistence seam — the single async interface the engine writes
//! through.
//!
//! The store owns atomicity: a `Commit` is the ledger entry plus any
//! record effect, and an implementation must apply both or neither. That
//! is what makes a crash mid-scan safe — a message is never marked
//! processed without its state change, or vice versa.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::pipeline::types::EventType;
use crate::records::{Application, ApplicationStatus, Contact};

/// One processed-message record. Append-only; exactly one entry per
/// (owner, provider message id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub message_id: String,
    pub processed_at: DateTime<Utc>,
    pub event: EventType,
    pub confidence: f32,
    /// The classifier rule that produced the event, for audit.
    pub rule: String,
}

/// Record mutation carried by a commit.
#[derive(Debug, Clone)]
pub enum CommitEffect {
    /// Ledger entry only — unrelated, unresolved, or no-op events.
    LedgerOnly,
    /// Create a new application record.
    CreateApplication { application: Application },
    /// Refresh an existing application's last-updated timestamp
    /// (duplicate confirmation).
    RefreshApplication { id: Uuid, at: DateTime<Utc> },
    /// Move an application to a new status.
    TransitionApplication {
        id: Uuid,
        to: ApplicationStatus,
        at: DateTime<Utc>,
    },
}

/// A single atomic unit: ledger entry, record effect, optional contact
/// upsert.
#[derive(Debug, Clone)]
pub struct Commit {
    pub entry: LedgerEntry,
    pub effect: CommitEffect,
    pub contact: Option<Contact>,
}

/// What the store did with a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Everything applied.
    Committed,
    /// A ledger entry for this message already existed — nothing applied.
    /// Safe no-op; another process won the race.
    AlreadyProcessed,
}

/// Backend-agnostic persistence trait covering the ledger, applications,
/// and contacts. All writes are idempotent upserts keyed as the data model
/// defines.
#[async_trait]
pub trait EngineStore: Send + Sync {
    /// Has this message already been processed for this owner?
    async fn has_ledger_entry(&self, owner: &str, message_id: &str) -> Result<bool, StoreError>;

    /// All applications for one owner.
    async fn applications(&self, owner: &str) -> Result<Vec<Application>, StoreError>;

    /// Atomically apply one message's commit. Contact upserts dedup by
    /// (owner, email): a re-sighting updates `last_contacted` instead of
    /// inserting.
    async fn commit(&self, owner: &str, commit: Commit) -> Result<CommitOutcome, StoreError>;
}
