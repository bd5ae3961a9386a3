//! Scan reporting types.
//!
//! The report is the engine's only output to the presentation layer:
//! counts for the dashboard, the unresolved list for manual review, and
//! the manual-override flags the stale-override rule requires.

use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::types::EventType;
use crate::records::ApplicationStatus;
use crate::records::resolve::UnresolvedReason;

/// Whether the scan covered its whole window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// The whole window was fetched and processed.
    Complete,
    /// The fetch failed or was cut short, or the store became unreachable.
    /// All commits made so far are preserved; re-scanning is safe.
    Incomplete,
}

/// A classified event that could not be mapped to exactly one
/// application. Nothing was mutated; the user decides.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedEvent {
    pub message_id: String,
    pub subject: String,
    pub event: EventType,
    pub company: Option<String>,
    pub position: Option<String>,
    pub reason: UnresolvedReason,
}

/// A transition that overrode a more recent manual status edit. The
/// email's content is ground truth, so the transition applied — this entry
/// makes it visible.
#[derive(Debug, Clone, Serialize)]
pub struct ManualOverride {
    pub application_id: Uuid,
    pub message_id: String,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// Aggregated result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub owner: String,
    pub status: ScanStatus,
    /// Messages seen in the window.
    pub scanned: u32,
    /// New application records created.
    pub imported: u32,
    /// Duplicate confirmations that refreshed an existing record.
    pub refreshed: u32,
    /// Status transitions applied.
    pub transitioned: u32,
    /// Events absorbed by a terminal or unsupported state.
    pub noops: u32,
    /// Messages already in the ledger.
    pub skipped_duplicate: u32,
    /// Malformed messages and per-message store failures.
    pub errors: u32,
    /// Contacts created or re-sighted.
    pub contacts_recorded: u32,
    pub unresolved: Vec<UnresolvedEvent>,
    pub manual_overrides: Vec<ManualOverride>,
}

impl ScanReport {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            status: ScanStatus::Complete,
            scanned: 0,
            imported: 0,
            refreshed: 0,
            transitioned: 0,
            noops: 0,
            skipped_duplicate: 0,
            errors: 0,
            contacts_recorded: 0,
            unresolved: Vec::new(),
            manual_overrides: Vec::new(),
        }
    }

    /// True when the scan changed nothing — the idempotence check.
    pub fn is_quiet(&self) -> bool {
        self.imported == 0
            && self.refreshed == 0
            && self.transitioned == 0
            && self.contacts_recorded == 0
    }
}
