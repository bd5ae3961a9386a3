//! Scan orchestration.
//!
//! Drives one bounded pass over an owner's mailbox window: normalize →
//! ledger check → signals → classify → resolve → state machine → contact,
//! with one atomic store commit per message. Messages are processed
//! sequentially in provider order so that later messages in a thread win
//! by arrival order, never by race.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::{ConfigError, NormalizeError, ScanError, StoreError};
use crate::mailbox::{MailboxProvider, ScanWindow};
use crate::pipeline::classifier::Classifier;
use crate::pipeline::contact::contact_for_message;
use crate::pipeline::fields::FieldExtractor;
use crate::pipeline::normalizer::normalize;
use crate::pipeline::signals::{SignalExtractor, SignalSet};
use crate::pipeline::types::{
    ClassificationResult, EventType, ExtractedFields, NormalizedMessage, RawMessage,
};
use crate::records::resolve::{Resolution, UnresolvedReason, resolve_new_application,
    resolve_response};
use crate::records::state_machine::{Transition, plan_transition};
use crate::records::{Application, ApplicationStatus, Contact, RecordSource};
use crate::scan::lock::ScanLocks;
use crate::scan::report::{ManualOverride, ScanReport, ScanStatus, UnresolvedEvent};
use crate::store::{Commit, CommitEffect, CommitOutcome, EngineStore, LedgerEntry};

/// Position recorded when a confirmation email names the company but not
/// the role.
const UNKNOWN_POSITION: &str = "Unknown Position";

/// What one committed message did, applied to the report only after the
/// store accepts the commit.
#[derive(Debug)]
enum MessageOutcome {
    Unrelated,
    Imported,
    Refreshed,
    Transitioned {
        application_id: uuid::Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        overrides_manual: bool,
    },
    NoOp,
    Unresolved(UnresolvedEvent),
}

/// Drives scans. One instance serves all owners; the lock registry keeps
/// concurrent scans for the same owner out.
pub struct ScanOrchestrator {
    mailbox: Arc<dyn MailboxProvider>,
    store: Arc<dyn EngineStore>,
    signals: SignalExtractor,
    classifier: Classifier,
    fields: FieldExtractor,
    window: ScanWindow,
    strict_resolution: bool,
    locks: ScanLocks,
}

impl ScanOrchestrator {
    pub fn new(
        config: &EngineConfig,
        mailbox: Arc<dyn MailboxProvider>,
        store: Arc<dyn EngineStore>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            mailbox,
            store,
            signals: SignalExtractor::new(config)?,
            classifier: Classifier::new(config)?,
            fields: FieldExtractor::new(),
            window: ScanWindow {
                lookback_days: config.lookback_days,
                limit: config.scan_limit,
            },
            strict_resolution: config.strict_resolution,
            locks: ScanLocks::new(),
        })
    }

    /// Run one scan for `owner`.
    ///
    /// Fails fast with `ScanAlreadyInProgress` when a scan for the same
    /// owner is running. Fetch failures and a mid-scan unreachable store
    /// end the scan early with status `Incomplete`; everything committed
    /// up to that point stays committed, and re-scanning is always safe.
    pub async fn scan(&self, owner: &str) -> Result<ScanReport, ScanError> {
        let _guard = self
            .locks
            .try_acquire(owner)
            .ok_or_else(|| ScanError::AlreadyInProgress {
                owner: owner.to_string(),
            })?;

        info!(owner, "Starting mailbox scan");
        let mut report = ScanReport::new(owner);

        let window = match self.mailbox.fetch_window(owner, &self.window).await {
            Ok(window) => window,
            Err(e) => {
                warn!(owner, error = %e, "Mailbox fetch failed, reporting partial scan");
                report.status = ScanStatus::Incomplete;
                return Ok(report);
            }
        };
        if window.truncated {
            debug!(owner, "Provider truncated the window");
            report.status = ScanStatus::Incomplete;
        }

        for raw in window.messages {
            report.scanned += 1;
            match self.process_message(owner, raw, &mut report).await {
                Ok(()) => {}
                Err(StoreError::Unavailable(reason)) => {
                    error!(owner, reason = %reason, "Store unreachable, aborting scan");
                    report.status = ScanStatus::Incomplete;
                    break;
                }
                Err(e) => {
                    warn!(owner, error = %e, "Message processing failed, will retry next scan");
                    report.errors += 1;
                }
            }
        }

        info!(
            owner,
            scanned = report.scanned,
            imported = report.imported,
            transitioned = report.transitioned,
            unresolved = report.unresolved.len(),
            skipped_duplicate = report.skipped_duplicate,
            errors = report.errors,
            "Scan finished"
        );
        Ok(report)
    }

    /// Run one message through the pipeline and commit atomically.
    ///
    /// Store errors propagate so the caller can distinguish an unreachable
    /// store from a per-message failure; everything else lands in the
    /// report.
    async fn process_message(
        &self,
        owner: &str,
        raw: RawMessage,
        report: &mut ScanReport,
    ) -> Result<(), StoreError> {
        let message = match normalize(raw) {
            Ok(message) => message,
            Err(NormalizeError::MalformedMessage { id }) => {
                debug!(owner, id = %id, "Skipping malformed message");
                report.errors += 1;
                return Ok(());
            }
        };
        let message_id = message.raw.provider_id.clone();

        if self.store.has_ledger_entry(owner, &message_id).await? {
            report.skipped_duplicate += 1;
            return Ok(());
        }

        let applications = self.store.applications(owner).await?;
        let known_companies: Vec<String> =
            applications.iter().map(|a| a.company.clone()).collect();
        let signals = self.signals.extract(&message, &known_companies);
        let result = self.classifier.classify(&signals);
        debug!(
            owner,
            id = %message_id,
            event = result.event.label(),
            rule = result.rule,
            "Classified message"
        );

        let entry = LedgerEntry {
            message_id: message_id.clone(),
            processed_at: Utc::now(),
            event: result.event,
            confidence: result.confidence,
            rule: result.rule.to_string(),
        };

        let (effect, contact, outcome) =
            self.plan_commit(owner, &message, &signals, &result, &applications);

        let contact_recorded = contact.is_some();
        let commit = Commit {
            entry,
            effect,
            contact,
        };
        match self.store.commit(owner, commit).await? {
            CommitOutcome::Committed => {
                if contact_recorded {
                    report.contacts_recorded += 1;
                }
                apply_outcome(report, &message_id, outcome);
            }
            CommitOutcome::AlreadyProcessed => {
                debug!(owner, id = %message_id, "Ledger write conflict, treating as duplicate");
                report.skipped_duplicate += 1;
            }
        }
        Ok(())
    }

    /// Decide what one classified message does to the records.
    fn plan_commit(
        &self,
        owner: &str,
        message: &NormalizedMessage,
        signals: &SignalSet,
        result: &ClassificationResult,
        applications: &[Application],
    ) -> (CommitEffect, Option<Contact>, MessageOutcome) {
        match result.event {
            EventType::Unrelated => (CommitEffect::LedgerOnly, None, MessageOutcome::Unrelated),
            EventType::NewApplication => {
                self.plan_new_application(owner, message, signals, applications)
            }
            EventType::Rejected | EventType::InterviewRequested | EventType::Offered => {
                self.plan_response(owner, message, signals, result.event, applications)
            }
        }
    }

    fn plan_new_application(
        &self,
        owner: &str,
        message: &NormalizedMessage,
        signals: &SignalSet,
        applications: &[Application],
    ) -> (CommitEffect, Option<Contact>, MessageOutcome) {
        let ExtractedFields { company, position } = self.fields.extract(message);
        let company = company.or_else(|| signals.mentions_known_company.clone());

        let Some(company) = company else {
            // A confirmation with no recoverable company cannot key a
            // record; it goes to the report for manual review.
            return (
                CommitEffect::LedgerOnly,
                None,
                MessageOutcome::Unresolved(unresolved_event(
                    message,
                    EventType::NewApplication,
                    None,
                    position,
                    UnresolvedReason::NoCompany,
                )),
            );
        };
        let position = position.unwrap_or_else(|| UNKNOWN_POSITION.to_string());

        match resolve_new_application(applications, &company, &position) {
            Resolution::Existing(app) => (
                CommitEffect::RefreshApplication {
                    id: app.id,
                    at: Utc::now(),
                },
                None,
                MessageOutcome::Refreshed,
            ),
            Resolution::CreateNew => {
                let application =
                    Application::imported(owner, company, position, message.raw.received_at);
                (
                    CommitEffect::CreateApplication { application },
                    None,
                    MessageOutcome::Imported,
                )
            }
            // resolve_new_application never reports unresolved
            Resolution::Unresolved(reason) => (
                CommitEffect::LedgerOnly,
                None,
                MessageOutcome::Unresolved(unresolved_event(
                    message,
                    EventType::NewApplication,
                    Some(company),
                    None,
                    reason,
                )),
            ),
        }
    }

    fn plan_response(
        &self,
        owner: &str,
        message: &NormalizedMessage,
        signals: &SignalSet,
        event: EventType,
        applications: &[Application],
    ) -> (CommitEffect, Option<Contact>, MessageOutcome) {
        let ExtractedFields { company, position } = self.fields.extract(message);
        let company = company.or_else(|| signals.mentions_known_company.clone());

        let resolution = resolve_response(
            applications,
            company.as_deref(),
            position.as_deref(),
            self.strict_resolution,
        );

        match resolution {
            Resolution::Existing(app) => {
                let contact = contact_for_message(
                    message,
                    signals,
                    event,
                    owner,
                    &app.company,
                    app.id,
                );
                match plan_transition(app.status, event) {
                    Transition::Advance { from, to } => {
                        let overrides_manual = app.status_source == RecordSource::Manual
                            && app.status_changed_at > message.raw.received_at;
                        (
                            CommitEffect::TransitionApplication {
                                id: app.id,
                                to,
                                at: message.raw.received_at,
                            },
                            contact,
                            MessageOutcome::Transitioned {
                                application_id: app.id,
                                from,
                                to,
                                overrides_manual,
                            },
                        )
                    }
                    // Terminal statuses absorb the event; the contact is
                    // still a real person who wrote in.
                    Transition::Refresh | Transition::NoOp => {
                        (CommitEffect::LedgerOnly, contact, MessageOutcome::NoOp)
                    }
                }
            }
            Resolution::CreateNew => {
                // Response events never create records; unreachable from
                // resolve_response but kept total.
                (CommitEffect::LedgerOnly, None, MessageOutcome::NoOp)
            }
            Resolution::Unresolved(reason) => (
                CommitEffect::LedgerOnly,
                None,
                MessageOutcome::Unresolved(unresolved_event(
                    message, event, company, position, reason,
                )),
            ),
        }
    }
}

fn unresolved_event(
    message: &NormalizedMessage,
    event: EventType,
    company: Option<String>,
    position: Option<String>,
    reason: UnresolvedReason,
) -> UnresolvedEvent {
    UnresolvedEvent {
        message_id: message.raw.provider_id.clone(),
        subject: message.raw.subject.clone(),
        event,
        company,
        position,
        reason,
    }
}

fn apply_outcome(report: &mut ScanReport, message_id: &str, outcome: MessageOutcome) {
    match outcome {
        MessageOutcome::Unrelated => {}
        MessageOutcome::Imported => report.imported += 1,
        MessageOutcome::Refreshed => report.refreshed += 1,
        MessageOutcome::Transitioned {
            application_id,
            from,
            to,
            overrides_manual,
        } => {
            report.transitioned += 1;
            if overrides_manual {
                report.manual_overrides.push(ManualOverride {
                    application_id,
                    message_id: message_id.to_string(),
                    from,
                    to,
                });
            }
        }
        MessageOutcome::NoOp => report.noops += 1,
        MessageOutcome::Unresolved(event) => report.unresolved.push(event),
    }
}
