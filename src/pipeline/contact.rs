//! Contact extraction — derives a counterparty contact from personal
//! responses.
//!
//! Runs only for interview requests, offers, and personally-sent
//! rejections. ATS and no-reply senders never become contacts; the
//! Connections feature is for people, not mailers.

use uuid::Uuid;

use crate::pipeline::fields::title_case;
use crate::pipeline::signals::SignalSet;
use crate::pipeline::types::{EventType, NormalizedMessage};
use crate::records::Contact;

/// Derive a contact for a classified message, if one is warranted.
///
/// `application_id` and `company` come from the resolved application, so
/// unresolved events never reach this function.
pub fn contact_for_message(
    message: &NormalizedMessage,
    signals: &SignalSet,
    event: EventType,
    owner: &str,
    company: &str,
    application_id: Uuid,
) -> Option<Contact> {
    if signals.sender_is_known_ats || signals.sender_is_automated {
        return None;
    }
    match event {
        EventType::InterviewRequested | EventType::Offered | EventType::Rejected => {}
        EventType::NewApplication | EventType::Unrelated => return None,
    }

    let email = bare_email(message)?;
    let name = display_name(message);
    let seen = message.raw.received_at;

    Some(Contact {
        id: Uuid::new_v4(),
        owner: owner.to_string(),
        name,
        email,
        company: company.to_string(),
        application_id,
        first_seen: seen,
        last_contacted: seen,
    })
}

fn bare_email(message: &NormalizedMessage) -> Option<String> {
    if message.sender_local.is_empty() || message.sender_domain.is_empty() {
        return None;
    }
    Some(format!(
        "{}@{}",
        message.sender_local, message.sender_domain
    ))
}

/// Sender display name, falling back to the email local part with
/// separators as spaces, title-cased.
fn display_name(message: &NormalizedMessage) -> String {
    if let Some(name) = message
        .raw
        .sender_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        return name.trim_matches(['"', '\'']).to_string();
    }
    name_from_local(&message.sender_local)
}

fn name_from_local(local: &str) -> String {
    title_case(&local.replace(['.', '_', '-', '+'], " "))
}
