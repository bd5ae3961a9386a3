//! Signal extraction — derives classification signals from a normalized
//! message.
//!
//! Signals are computed independently and are side-effect-free. Pattern
//! families come from `EngineConfig` and are compiled once at construction;
//! an invalid pattern is a configuration error, not a runtime surprise.

use regex::Regex;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::pipeline::types::NormalizedMessage;
use crate::records::normalize_company;

/// The signal set derived from one message. Ephemeral — never persisted.
#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    pub has_rejection_keyword: bool,
    pub has_interview_keyword: bool,
    pub has_offer_keyword: bool,
    pub has_confirmation_keyword: bool,
    /// Sender domain matches the configured ATS list. Carries the matched
    /// domain for audit.
    pub sender_is_known_ats: bool,
    pub ats_platform: Option<String>,
    /// Local part matches a no-reply/automation pattern.
    pub sender_is_automated: bool,
    /// An existing application's company name referenced in the subject or
    /// body. Used to resolve ambiguous events to an existing record.
    pub mentions_known_company: Option<String>,
    /// Recruiter cold outreach about a new position, not a response.
    pub looks_like_recruiter_outreach: bool,
    /// Subject carries a reply/forward prefix.
    pub is_thread_reply: bool,
}

/// Compiles the configured pattern families and derives signal sets.
#[derive(Debug)]
pub struct SignalExtractor {
    rejection: Vec<Regex>,
    interview: Vec<Regex>,
    offer: Vec<Regex>,
    confirmation: Vec<Regex>,
    outreach: Vec<Regex>,
    outreach_min_hits: usize,
    ats_domains: Vec<String>,
}

impl SignalExtractor {
    /// Build an extractor from configuration. Fails on the first pattern
    /// that does not compile.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rejection: compile_family("rejection", &config.rejection_patterns)?,
            interview: compile_family("interview", &config.interview_patterns)?,
            offer: compile_family("offer", &config.offer_patterns)?,
            confirmation: compile_family("confirmation", &config.confirmation_patterns)?,
            outreach: compile_family("outreach", &config.outreach_patterns)?,
            outreach_min_hits: config.outreach_min_hits.max(1),
            ats_domains: config
                .ats_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
        })
    }

    /// Derive the signal set for one message.
    ///
    /// `known_companies` are the owner's existing application company names,
    /// matched fuzzily (normalized, substring in either direction).
    pub fn extract(&self, message: &NormalizedMessage, known_companies: &[String]) -> SignalSet {
        let subject = &message.subject_lower;
        let body = &message.body_lower;

        let ats_platform = self.matched_ats_domain(&message.sender_domain);
        let outreach_hits = self
            .outreach
            .iter()
            .filter(|r| r.is_match(subject) || r.is_match(body))
            .count();

        let signals = SignalSet {
            has_rejection_keyword: family_hits(&self.rejection, subject, body),
            has_interview_keyword: family_hits(&self.interview, subject, body),
            has_offer_keyword: family_hits(&self.offer, subject, body),
            has_confirmation_keyword: family_hits(&self.confirmation, subject, body),
            sender_is_known_ats: ats_platform.is_some(),
            ats_platform,
            sender_is_automated: message.is_automated_sender,
            mentions_known_company: known_company_mention(subject, body, known_companies),
            looks_like_recruiter_outreach: outreach_hits >= self.outreach_min_hits,
            is_thread_reply: is_thread_reply(subject),
        };

        debug!(
            id = %message.raw.provider_id,
            rejection = signals.has_rejection_keyword,
            interview = signals.has_interview_keyword,
            offer = signals.has_offer_keyword,
            confirmation = signals.has_confirmation_keyword,
            ats = signals.sender_is_known_ats,
            automated = signals.sender_is_automated,
            outreach = signals.looks_like_recruiter_outreach,
            "Extracted signals"
        );

        signals
    }

    /// Suffix-match the sender domain against the ATS list.
    fn matched_ats_domain(&self, sender_domain: &str) -> Option<String> {
        if sender_domain.is_empty() {
            return None;
        }
        self.ats_domains
            .iter()
            .find(|d| sender_domain == d.as_str() || sender_domain.ends_with(&format!(".{d}")))
            .cloned()
    }
}

fn compile_family(family: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| ConfigError::InvalidPattern {
                family: family.to_string(),
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

/// A family hits if any pattern matches subject OR body.
fn family_hits(patterns: &[Regex], subject: &str, body: &str) -> bool {
    patterns
        .iter()
        .any(|r| r.is_match(subject) || r.is_match(body))
}

fn is_thread_reply(subject: &str) -> bool {
    subject.starts_with("re:") || subject.starts_with("fw:") || subject.starts_with("fwd:")
}

/// First known company whose normalized name appears in the subject or
/// body. Very short names are skipped to keep substring matching honest.
fn known_company_mention(subject: &str, body: &str, known_companies: &[String]) -> Option<String> {
    for name in known_companies {
        let needle = normalize_company(name);
        if needle.len() < 3 {
            continue;
        }
        if subject.contains(&needle) || body.contains(&needle) {
            return Some(name.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalizer::normalize;
    use crate::pipeline::types::RawMessage;
    use chrono::Utc;

    fn message(sender: &str, subject: &str, body: &str) -> NormalizedMessage {
        normalize(RawMessage {
            provider_id: "m-1".into(),
            sender_address: sender.into(),
            sender_name: None,
            subject: subject.into(),
            body: body.into(),
            received_at: Utc::now(),
            thread_id: None,
        })
        .unwrap()
    }

    fn extractor() -> SignalExtractor {
        SignalExtractor::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn rejection_family_hits_on_body() {
        let msg = message(
            "recruiting@acme.com",
            "Your application",
            "Unfortunately we will not be moving forward.",
        );
        let signals = extractor().extract(&msg, &[]);
        assert!(signals.has_rejection_keyword);
        assert!(!signals.has_offer_keyword);
    }

    #[test]
    fn interview_family_hits_on_subject() {
        let msg = message("jane@acme.com", "Interview invitation", "Hi there");
        let signals = extractor().extract(&msg, &[]);
        assert!(signals.has_interview_keyword);
    }

    #[test]
    fn offer_family_hits() {
        let msg = message(
            "jane@acme.com",
            "Your offer letter",
            "We are pleased to offer you the position.",
        );
        let signals = extractor().extract(&msg, &[]);
        assert!(signals.has_offer_keyword);
    }

    #[test]
    fn confirmation_family_hits() {
        let msg = message(
            "noreply@greenhouse.io",
            "Thank you for applying to Acme",
            "We received your application.",
        );
        let signals = extractor().extract(&msg, &[]);
        assert!(signals.has_confirmation_keyword);
    }

    #[test]
    fn ats_domain_suffix_match() {
        let msg = message("noreply@mail.greenhouse.io", "s", "b");
        let signals = extractor().extract(&msg, &[]);
        assert!(signals.sender_is_known_ats);
        assert_eq!(signals.ats_platform.as_deref(), Some("greenhouse.io"));
    }

    #[test]
    fn non_ats_domain_not_flagged() {
        let msg = message("jane@acme.com", "s", "b");
        let signals = extractor().extract(&msg, &[]);
        assert!(!signals.sender_is_known_ats);
        assert!(signals.ats_platform.is_none());
    }

    #[test]
    fn lookalike_domain_not_flagged() {
        // Suffix match must not treat "notgreenhouse.io" as greenhouse.io
        let msg = message("noreply@notgreenhouse.io", "s", "b");
        let signals = extractor().extract(&msg, &[]);
        assert!(!signals.sender_is_known_ats);
    }

    #[test]
    fn known_company_mention_case_insensitive() {
        let msg = message("jane@acme.com", "Update on your Acme application", "b");
        let signals = extractor().extract(&msg, &["ACME".to_string()]);
        assert_eq!(signals.mentions_known_company.as_deref(), Some("ACME"));
    }

    #[test]
    fn known_company_mention_strips_suffix() {
        let msg = message("jane@acme.com", "News from acme", "b");
        let signals = extractor().extract(&msg, &["Acme, Inc.".to_string()]);
        assert_eq!(
            signals.mentions_known_company.as_deref(),
            Some("Acme, Inc.")
        );
    }

    #[test]
    fn no_mention_for_unknown_company() {
        let msg = message("jane@acme.com", "Update from Initech", "b");
        let signals = extractor().extract(&msg, &["Globex".to_string()]);
        assert!(signals.mentions_known_company.is_none());
    }

    #[test]
    fn outreach_requires_two_hits() {
        // One outreach phrase alone is not enough
        let one = message(
            "recruiter@agency.com",
            "Hello",
            "I'm reaching out to say hi.",
        );
        let signals = extractor().extract(&one, &[]);
        assert!(!signals.looks_like_recruiter_outreach);

        let two = message(
            "recruiter@agency.com",
            "Exciting opportunity",
            "I came across your profile and I'm reaching out about an open role.",
        );
        let signals = extractor().extract(&two, &[]);
        assert!(signals.looks_like_recruiter_outreach);
    }

    #[test]
    fn thread_reply_detection() {
        for subject in ["Re: your application", "RE: hello", "Fwd: update", "FW: hi"] {
            let msg = message("a@b.com", subject, "b");
            assert!(
                extractor().extract(&msg, &[]).is_thread_reply,
                "{subject} should be a thread reply"
            );
        }
        let msg = message("a@b.com", "Regarding your application", "b");
        assert!(!extractor().extract(&msg, &[]).is_thread_reply);
    }

    #[test]
    fn automated_flag_carried_from_normalizer() {
        let msg = message("no-reply@acme.com", "s", "b");
        assert!(extractor().extract(&msg, &[]).sender_is_automated);
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let config = EngineConfig {
            rejection_patterns: vec!["(unclosed".to_string()],
            ..EngineConfig::default()
        };
        let err = SignalExtractor::new(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPattern { ref family, .. } if family == "rejection"
        ));
    }
}
