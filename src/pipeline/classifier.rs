//! Classification — combines a signal set into an event type.
//!
//! Rule tiers run in strict priority order, first match wins. No scoring
//! blend across tiers: every decision traces to exactly one rule id, which
//! keeps behavior auditable and testable.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::pipeline::signals::SignalSet;
use crate::pipeline::types::{ClassificationResult, EventType};

const OFFER_CONFIDENCE: f32 = 0.9;
const INTERVIEW_CONFIDENCE: f32 = 0.85;
const REJECTION_CONFIDENCE: f32 = 0.8;
const CONFIRMATION_CONFIDENCE: f32 = 0.7;

/// Tiered rule classifier.
pub struct Classifier {
    threshold: f32,
}

impl Classifier {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&config.confidence_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: config.confidence_threshold,
            });
        }
        Ok(Self {
            threshold: config.confidence_threshold,
        })
    }

    /// Classify one message's signal set.
    ///
    /// Tier order:
    /// 1. recruiter outreach veto (cold prospecting is never a response)
    /// 2. offer keywords, unless an automated sender pairs them with
    ///    rejection language ("unable to offer")
    /// 3. interview keywords — deliberately ahead of rejection, so a
    ///    "unfortunately ... but we'd like to schedule a call" message
    ///    resolves to the more actionable outcome
    /// 4. rejection keywords
    /// 5. confirmation keywords from an ATS or automated sender, excluding
    ///    reply threads
    ///
    /// Results below the confidence threshold downgrade to `Unrelated`
    /// while keeping the matched rule id for audit.
    pub fn classify(&self, signals: &SignalSet) -> ClassificationResult {
        let result = self.match_tier(signals);

        if result.event != EventType::Unrelated && result.confidence < self.threshold {
            debug!(
                rule = result.rule,
                confidence = result.confidence,
                threshold = self.threshold,
                "Below confidence threshold, downgrading to unrelated"
            );
            return ClassificationResult {
                event: EventType::Unrelated,
                ..result
            };
        }

        result
    }

    fn match_tier(&self, signals: &SignalSet) -> ClassificationResult {
        if signals.looks_like_recruiter_outreach {
            return ClassificationResult {
                event: EventType::Unrelated,
                confidence: 0.0,
                rule: "recruiter-outreach",
            };
        }

        // Automated rejections phrase as "unable to offer you the position";
        // only that pairing suppresses the offer tier.
        let automated_negative_context =
            signals.has_rejection_keyword && signals.sender_is_automated;
        if signals.has_offer_keyword && !automated_negative_context {
            return ClassificationResult {
                event: EventType::Offered,
                confidence: OFFER_CONFIDENCE,
                rule: "offer-keywords",
            };
        }

        if signals.has_interview_keyword {
            return ClassificationResult {
                event: EventType::InterviewRequested,
                confidence: INTERVIEW_CONFIDENCE,
                rule: "interview-keywords",
            };
        }

        if signals.has_rejection_keyword {
            return ClassificationResult {
                event: EventType::Rejected,
                confidence: REJECTION_CONFIDENCE,
                rule: "rejection-keywords",
            };
        }

        if signals.has_confirmation_keyword
            && (signals.sender_is_known_ats || signals.sender_is_automated)
            && !signals.is_thread_reply
        {
            return ClassificationResult {
                event: EventType::NewApplication,
                confidence: CONFIRMATION_CONFIDENCE,
                rule: "ats-confirmation",
            };
        }

        ClassificationResult {
            event: EventType::Unrelated,
            confidence: 0.0,
            rule: "no-match",
        }
    }
}
