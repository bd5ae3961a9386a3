//! End-to-end scan scenarios against the full engine wiring.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use jobtrail::config::EngineConfig;
use jobtrail::error::MailboxError;
use jobtrail::mailbox::{MailWindow, MailboxProvider, ScanWindow};
use jobtrail::pipeline::types::RawMessage;
use jobtrail::records::{Application, ApplicationStatus, RecordSource};
use jobtrail::scan::{ScanOrchestrator, ScanStatus};
use jobtrail::store::MemoryStore;

/// Mailbox fake whose window can be swapped between scans.
struct ScriptedMailbox {
    window: Mutex<MailWindow>,
}

impl ScriptedMailbox {
    fn new(messages: Vec<RawMessage>) -> Self {
        Self {
            window: Mutex::new(MailWindow {
                messages,
                truncated: false,
            }),
        }
    }

    fn set_messages(&self, messages: Vec<RawMessage>) {
        self.window.lock().unwrap().messages = messages;
    }
}

#[async_trait]
impl MailboxProvider for ScriptedMailbox {
    async fn fetch_window(
        &self,
        _owner: &str,
        _window: &ScanWindow,
    ) -> Result<MailWindow, MailboxError> {
        Ok(self.window.lock().unwrap().clone())
    }
}

fn message(id: &str, sender: &str, subject: &str, body: &str, days_ago: i64) -> RawMessage {
    RawMessage {
        provider_id: id.into(),
        sender_address: sender.into(),
        sender_name: None,
        subject: subject.into(),
        body: body.into(),
        received_at: Utc::now() - Duration::days(days_ago),
        thread_id: None,
    }
}

fn engine(
    mailbox: Arc<ScriptedMailbox>,
    store: Arc<MemoryStore>,
) -> ScanOrchestrator {
    ScanOrchestrator::new(&EngineConfig::default(), mailbox, store).unwrap()
}

#[tokio::test]
async fn interview_email_beats_rejection_keyword_and_creates_contact() {
    let store = Arc::new(MemoryStore::new());
    store.seed_application(Application::imported(
        "u1",
        "Acme",
        "Engineer",
        Utc::now() - Duration::days(14),
    ));
    let mailbox = Arc::new(ScriptedMailbox::new(vec![message(
        "msg-100",
        "jane.doe@acme.com",
        "Interview invitation",
        "We'd like to schedule a call unfortunately not this week",
        1,
    )]));

    let report = engine(mailbox, store.clone()).scan("u1").await.unwrap();

    assert_eq!(report.transitioned, 1);
    let apps = store.applications_snapshot("u1");
    assert_eq!(apps[0].status, ApplicationStatus::Interviewing);

    let contacts = store.contacts_snapshot("u1");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email, "jane.doe@acme.com");
    assert_eq!(contacts[0].name, "Jane Doe");
    assert_eq!(contacts[0].company, "Acme");
}

#[tokio::test]
async fn duplicate_confirmations_across_scans_create_one_application() {
    let store = Arc::new(MemoryStore::new());
    let first = message(
        "msg-100",
        "noreply@greenhouse.io",
        "Thank you for applying to Acme — Software Engineer",
        "We have received your application.",
        3,
    );
    let mut second = first.clone();
    second.provider_id = "msg-110".into();

    let mailbox = Arc::new(ScriptedMailbox::new(vec![first.clone()]));
    let engine = engine(mailbox.clone(), store.clone());

    let report = engine.scan("u1").await.unwrap();
    assert_eq!(report.imported, 1);

    // The next window still contains the first message plus its twin
    mailbox.set_messages(vec![first, second]);
    let report = engine.scan("u1").await.unwrap();

    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(report.imported, 0);
    assert_eq!(report.refreshed, 1);

    let apps = store.applications_snapshot("u1");
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].company, "Acme");
    assert_eq!(apps[0].position, "Software Engineer");
}

#[tokio::test]
async fn full_lifecycle_in_provider_order() {
    let store = Arc::new(MemoryStore::new());
    let mailbox = Arc::new(ScriptedMailbox::new(vec![
        message(
            "msg-1",
            "noreply@greenhouse.io",
            "Thank you for applying to Acme — Software Engineer",
            "We have received your application.",
            6,
        ),
        message(
            "msg-2",
            "jane.doe@acme.com",
            "Interview invitation",
            "We'd like to schedule a call about your application.",
            4,
        ),
        message(
            "msg-3",
            "jane.doe@acme.com",
            "Your offer",
            "We are pleased to offer you the position.",
            1,
        ),
    ]));

    let report = engine(mailbox, store.clone()).scan("u1").await.unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.transitioned, 2);
    assert_eq!(report.status, ScanStatus::Complete);
    assert!(report.unresolved.is_empty());

    let apps = store.applications_snapshot("u1");
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].status, ApplicationStatus::Offered);
    assert_eq!(apps[0].source, RecordSource::Imported);

    // Jane appeared twice but is one contact
    let contacts = store.contacts_snapshot("u1");
    assert_eq!(contacts.len(), 1);
}

#[tokio::test]
async fn rescan_of_unchanged_mailbox_is_quiet() {
    let store = Arc::new(MemoryStore::new());
    let mailbox = Arc::new(ScriptedMailbox::new(vec![
        message(
            "msg-1",
            "noreply@greenhouse.io",
            "Thank you for applying to Acme — Software Engineer",
            "We have received your application.",
            6,
        ),
        message(
            "msg-2",
            "jane.doe@acme.com",
            "Interview invitation",
            "We'd like to schedule a call.",
            2,
        ),
    ]));
    let engine = engine(mailbox, store.clone());

    let first = engine.scan("u1").await.unwrap();
    assert!(!first.is_quiet());
    let ledger_size = store.ledger_len("u1");

    let second = engine.scan("u1").await.unwrap();
    assert!(second.is_quiet());
    assert_eq!(second.skipped_duplicate, 2);
    assert_eq!(second.transitioned, 0);
    assert_eq!(store.ledger_len("u1"), ledger_size);
}

#[tokio::test]
async fn recruiter_outreach_is_unrelated() {
    let store = Arc::new(MemoryStore::new());
    let mailbox = Arc::new(ScriptedMailbox::new(vec![message(
        "msg-1",
        "maria@talentpartners.com",
        "Exciting opportunity — Senior Engineer",
        "I came across your profile and think you'd be a perfect fit for an \
         open role with my client. Are you open to a quick chat?",
        1,
    )]));

    let report = engine(mailbox, store.clone()).scan("u1").await.unwrap();

    assert!(report.is_quiet());
    assert!(store.applications_snapshot("u1").is_empty());
    assert!(store.contacts_snapshot("u1").is_empty());
    // Still processed exactly once
    assert_eq!(store.ledger_len("u1"), 1);
}

#[tokio::test]
async fn reply_thread_confirmation_does_not_import() {
    let store = Arc::new(MemoryStore::new());
    let mailbox = Arc::new(ScriptedMailbox::new(vec![message(
        "msg-1",
        "noreply@greenhouse.io",
        "Re: Thank you for applying to Acme — Software Engineer",
        "Following up on your application.",
        1,
    )]));

    let report = engine(mailbox, store.clone()).scan("u1").await.unwrap();

    assert_eq!(report.imported, 0);
    assert!(store.applications_snapshot("u1").is_empty());
}

#[tokio::test]
async fn terminal_application_stays_terminal_across_scans() {
    let store = Arc::new(MemoryStore::new());
    let mut app = Application::imported("u1", "Acme", "Engineer", Utc::now() - Duration::days(30));
    app.status = ApplicationStatus::Withdrawn;
    store.seed_application(app);

    let mailbox = Arc::new(ScriptedMailbox::new(vec![message(
        "msg-1",
        "jane.doe@acme.com",
        "Interview invitation",
        "We'd like to schedule a call.",
        1,
    )]));

    let report = engine(mailbox, store.clone()).scan("u1").await.unwrap();

    assert_eq!(report.transitioned, 0);
    assert_eq!(report.noops, 1);
    assert_eq!(
        store.applications_snapshot("u1")[0].status,
        ApplicationStatus::Withdrawn
    );
}

#[tokio::test]
async fn scans_for_different_owners_are_independent() {
    let store = Arc::new(MemoryStore::new());
    let mailbox = Arc::new(ScriptedMailbox::new(vec![message(
        "msg-1",
        "noreply@greenhouse.io",
        "Thank you for applying to Acme — Software Engineer",
        "We have received your application.",
        1,
    )]));
    let engine = engine(mailbox, store.clone());

    engine.scan("u1").await.unwrap();
    let report = engine.scan("u2").await.unwrap();

    // Same message id, different owner: processed fresh, not a duplicate
    assert_eq!(report.skipped_duplicate, 0);
    assert_eq!(report.imported, 1);
    assert_eq!(store.applications_snapshot("u1").len(), 1);
    assert_eq!(store.applications_snapshot("u2").len(), 1);
}
