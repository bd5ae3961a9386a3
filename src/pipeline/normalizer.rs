//! Message normalization — raw provider messages to the canonical
//! representation the rest of the pipeline consumes.
//!
//! Pure and deterministic: the same `RawMessage` always yields the same
//! `NormalizedMessage`. No configuration, no I/O.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::NormalizeError;
use crate::pipeline::types::{NormalizedMessage, RawMessage};

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// No-reply/automation local parts. Shared team mailboxes (careers@, hr@)
/// count as automated: nothing behind them is a personal contact.
static AUTOMATED_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^(
            no[-_.]?reply
            | do[-_.]?not[-_.]?reply
            | notifications?
            | mailer[-_]?daemon
            | postmaster
            | auto[-_.]?(reply|confirm|mailer)
            | alerts?
            | updates?
            | jobs?
            | careers?
            | recruiting
            | recruitment
            | talent
            | hr
            | hiring
            | applications?
            | candidates?
        )([-_.+@].*)?$",
    )
    .unwrap()
});

/// Normalize a raw message.
///
/// Strips HTML and quoted-reply boilerplate from the body, lowercases the
/// derived text, and splits the sender address. Fails with
/// `MalformedMessage` when subject and body are both empty and the sender
/// is absent — the orchestrator counts and skips such messages.
pub fn normalize(raw: RawMessage) -> Result<NormalizedMessage, NormalizeError> {
    let sender = bare_address(&raw.sender_address);
    if sender.is_empty() && raw.subject.trim().is_empty() && raw.body.trim().is_empty() {
        return Err(NormalizeError::MalformedMessage {
            id: raw.provider_id.clone(),
        });
    }

    let body_clean = strip_quoted_text(&strip_html(&raw.body));
    let subject_lower = raw.subject.trim().to_lowercase();
    let body_lower = body_clean.to_lowercase();
    let (sender_local, sender_domain) = split_address(&sender);
    let is_automated_sender = AUTOMATED_LOCAL.is_match(&sender_local);

    Ok(NormalizedMessage {
        raw,
        body_clean,
        subject_lower,
        body_lower,
        sender_local,
        sender_domain,
        is_automated_sender,
    })
}

/// Strip HTML tags and decode the handful of entities that survive
/// plain-text conversion.
pub fn strip_html(body: &str) -> String {
    let stripped = HTML_TAG.replace_all(body, " ");
    stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Strip quoted text from an email body.
///
/// Removes:
/// - Lines starting with `>` (quoted reply lines)
/// - Everything from an "On ... wrote:" attribution line onwards
/// - Everything from a "--- Original Message ---" separator onwards
///
/// Pure string parsing.
pub fn strip_quoted_text(body: &str) -> String {
    let mut result = Vec::new();

    for line in body.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('>') {
            continue;
        }

        // "On Mon, Jan 1, 2026 at 10:00 AM Alice <alice@ex.com> wrote:"
        if trimmed.starts_with("On ") && trimmed.ends_with("wrote:") {
            break;
        }

        if trimmed.starts_with("---") && trimmed.contains("Original Message") {
            break;
        }

        result.push(line);
    }

    while result.last().is_some_and(|l| l.trim().is_empty()) {
        result.pop();
    }

    result.join("\n")
}

/// Reduce a sender field to the bare address, tolerating the
/// `Display Name <user@domain>` form some providers hand over.
fn bare_address(sender: &str) -> String {
    let trimmed = sender.trim();
    if let (Some(start), Some(end)) = (trimmed.find('<'), trimmed.rfind('>'))
        && end > start
    {
        return trimmed[start + 1..end].trim().to_string();
    }
    trimmed.to_string()
}

/// Split an address into lowercase (local, domain). Addresses without an
/// `@` come back with an empty domain.
fn split_address(address: &str) -> (String, String) {
    match address.split_once('@') {
        Some((local, domain)) => (local.to_lowercase(), domain.to_lowercase()),
        None => (address.to_lowercase(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn raw(sender: &str, subject: &str, body: &str) -> RawMessage {
        RawMessage {
            provider_id: "msg-1".into(),
            sender_address: sender.into(),
            sender_name: None,
            subject: subject.into(),
            body: body.into(),
            received_at: Utc::now(),
            thread_id: None,
        }
    }

    #[test]
    fn normalizes_case_and_splits_sender() {
        let msg = normalize(raw(
            "Jane.Doe@Acme.COM",
            "Interview Invitation",
            "We'd like to Schedule a Call",
        ))
        .unwrap();
        assert_eq!(msg.subject_lower, "interview invitation");
        assert_eq!(msg.body_lower, "we'd like to schedule a call");
        assert_eq!(msg.sender_local, "jane.doe");
        assert_eq!(msg.sender_domain, "acme.com");
        assert!(!msg.is_automated_sender);
    }

    #[test]
    fn same_input_same_output() {
        let a = normalize(raw("a@b.com", "Subject", "Body > here")).unwrap();
        let b = normalize(raw("a@b.com", "Subject", "Body > here")).unwrap();
        assert_eq!(a.subject_lower, b.subject_lower);
        assert_eq!(a.body_lower, b.body_lower);
        assert_eq!(a.body_clean, b.body_clean);
    }

    #[test]
    fn strips_html_tags() {
        let msg = normalize(raw(
            "noreply@greenhouse.io",
            "Thanks",
            "<html><body><p>Thank you for <b>applying</b>!</p></body></html>",
        ))
        .unwrap();
        assert!(!msg.body_clean.contains('<'));
        assert!(msg.body_lower.contains("thank you for  applying !"));
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(strip_html("Smith &amp; Co&nbsp;Ltd"), "Smith & Co Ltd");
    }

    #[test]
    fn strips_quoted_reply_lines() {
        let body = "Sounds good!\n\n> Earlier message\n> more quoted\nThanks";
        assert_eq!(strip_quoted_text(body), "Sounds good!\n\nThanks");
    }

    #[test]
    fn strips_on_wrote_attribution_and_rest() {
        let body =
            "We'd love to chat.\n\nOn Mon, Jan 5, 2026 at 9:00 AM Bob <bob@x.com> wrote:\nOld text";
        assert_eq!(strip_quoted_text(body), "We'd love to chat.");
    }

    #[test]
    fn strips_original_message_separator() {
        let body = "Reply here\n\n--- Original Message ---\nold";
        assert_eq!(strip_quoted_text(body), "Reply here");
    }

    #[test]
    fn detects_automated_senders() {
        for local in [
            "noreply@acme.com",
            "no-reply@acme.com",
            "do_not_reply@acme.com",
            "notifications@github.com",
            "mailer-daemon@x.com",
            "careers@acme.com",
            "hr@acme.com",
            "jobs-noreply@linkedin.com",
        ] {
            let msg = normalize(raw(local, "s", "b")).unwrap();
            assert!(msg.is_automated_sender, "{local} should be automated");
        }
    }

    #[test]
    fn human_senders_not_automated() {
        for local in ["jane.doe@acme.com", "bob@startup.io", "harriet@corp.com"] {
            let msg = normalize(raw(local, "s", "b")).unwrap();
            assert!(!msg.is_automated_sender, "{local} should not be automated");
        }
    }

    #[test]
    fn tolerates_display_name_form() {
        let msg = normalize(raw("\"Acme Careers\" <careers@acme.com>", "s", "b")).unwrap();
        assert_eq!(msg.sender_local, "careers");
        assert_eq!(msg.sender_domain, "acme.com");
    }

    #[test]
    fn malformed_when_everything_empty() {
        let err = normalize(raw("", "", "   ")).unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedMessage { .. }));
    }

    #[test]
    fn not_malformed_with_sender_only() {
        assert!(normalize(raw("a@b.com", "", "")).is_ok());
    }

    #[test]
    fn not_malformed_with_subject_only() {
        assert!(normalize(raw("", "Hello", "")).is_ok());
    }
}
