//! In-memory store backend.
//!
//! The reference `EngineStore`: used by the test suite and small
//! single-process hosts. One mutex section per commit is the atomicity
//! guarantee — either the ledger entry and its effect both land, or the
//! commit is rejected as already processed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::records::{Application, ApplicationStatus, Contact, RecordSource};
use crate::store::traits::{Commit, CommitEffect, CommitOutcome, EngineStore, LedgerEntry};

#[derive(Debug, Default)]
struct OwnerState {
    ledger: HashMap<String, LedgerEntry>,
    applications: Vec<Application>,
    contacts: Vec<Contact>,
}

/// In-memory `EngineStore` implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    owners: Mutex<HashMap<String, OwnerState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an application, e.g. one the user entered manually.
    pub fn seed_application(&self, application: Application) {
        let mut owners = self.owners.lock().unwrap();
        owners
            .entry(application.owner.clone())
            .or_default()
            .applications
            .push(application);
    }

    /// Snapshot of one owner's applications (test helper).
    pub fn applications_snapshot(&self, owner: &str) -> Vec<Application> {
        let owners = self.owners.lock().unwrap();
        owners
            .get(owner)
            .map(|s| s.applications.clone())
            .unwrap_or_default()
    }

    /// Snapshot of one owner's contacts (test helper).
    pub fn contacts_snapshot(&self, owner: &str) -> Vec<Contact> {
        let owners = self.owners.lock().unwrap();
        owners
            .get(owner)
            .map(|s| s.contacts.clone())
            .unwrap_or_default()
    }

    /// Number of ledger entries for one owner (test helper).
    pub fn ledger_len(&self, owner: &str) -> usize {
        let owners = self.owners.lock().unwrap();
        owners.get(owner).map(|s| s.ledger.len()).unwrap_or(0)
    }
}

#[async_trait]
impl EngineStore for MemoryStore {
    async fn has_ledger_entry(&self, owner: &str, message_id: &str) -> Result<bool, StoreError> {
        let owners = self.owners.lock().unwrap();
        Ok(owners
            .get(owner)
            .is_some_and(|s| s.ledger.contains_key(message_id)))
    }

    async fn applications(&self, owner: &str) -> Result<Vec<Application>, StoreError> {
        Ok(self.applications_snapshot(owner))
    }

    async fn commit(&self, owner: &str, commit: Commit) -> Result<CommitOutcome, StoreError> {
        let mut owners = self.owners.lock().unwrap();
        let state = owners.entry(owner.to_string()).or_default();

        if state.ledger.contains_key(&commit.entry.message_id) {
            return Ok(CommitOutcome::AlreadyProcessed);
        }

        match commit.effect {
            CommitEffect::LedgerOnly => {}
            CommitEffect::CreateApplication { application } => {
                state.applications.push(application);
            }
            CommitEffect::RefreshApplication { id, at } => {
                apply_refresh(state, id, at)?;
            }
            CommitEffect::TransitionApplication { id, to, at } => {
                apply_transition(state, id, to, at)?;
            }
        }

        if let Some(contact) = commit.contact {
            upsert_contact(state, contact);
        }

        state
            .ledger
            .insert(commit.entry.message_id.clone(), commit.entry);
        Ok(CommitOutcome::Committed)
    }
}

fn find_application(
    state: &mut OwnerState,
    id: Uuid,
) -> Result<&mut Application, StoreError> {
    state
        .applications
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| StoreError::Query(format!("application {id} not found")))
}

fn apply_refresh(state: &mut OwnerState, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
    let application = find_application(state, id)?;
    application.updated_at = at;
    Ok(())
}

fn apply_transition(
    state: &mut OwnerState,
    id: Uuid,
    to: ApplicationStatus,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    let application = find_application(state, id)?;
    application.status = to;
    application.status_source = RecordSource::Imported;
    application.status_changed_at = at;
    application.updated_at = at;
    Ok(())
}

fn upsert_contact(state: &mut OwnerState, contact: Contact) {
    let email = contact.email.to_lowercase();
    match state
        .contacts
        .iter_mut()
        .find(|c| c.email.to_lowercase() == email)
    {
        Some(existing) => {
            existing.last_contacted = contact.last_contacted;
        }
        None => state.contacts.push(contact),
    }
}
