//! Engine configuration.
//!
//! Every knob the classifier and orchestrator consume lives here so that
//! pattern lists can be tuned without code changes. The defaults carry the
//! phrase lists that shipped with the product; hosts deserialize partial
//! overrides on top of them.

use serde::{Deserialize, Serialize};

/// Configuration for the import engine.
///
/// Keyword patterns are regular expressions matched against the lowercase
/// subject and cleaned body, so they should be authored in lowercase.
/// Word boundaries (`\b`) are supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rejection keyword family.
    pub rejection_patterns: Vec<String>,
    /// Interview-request keyword family.
    pub interview_patterns: Vec<String>,
    /// Offer keyword family.
    pub offer_patterns: Vec<String>,
    /// Application-confirmation keyword family.
    pub confirmation_patterns: Vec<String>,
    /// Recruiter cold-outreach family. These are prospecting emails about a
    /// new position, not responses to an application the user submitted.
    pub outreach_patterns: Vec<String>,
    /// How many outreach patterns must hit before a message is treated as
    /// recruiter outreach.
    pub outreach_min_hits: usize,
    /// Applicant-tracking-system domains (suffix match on the sender domain).
    pub ats_domains: Vec<String>,
    /// Classifications below this confidence are downgraded to unrelated.
    pub confidence_threshold: f32,
    /// How far back a scan window reaches.
    pub lookback_days: u32,
    /// Maximum messages fetched per scan.
    pub scan_limit: usize,
    /// When true, response events resolve only on an exact
    /// (company, position) match; the single-candidate company fallback is
    /// disabled.
    pub strict_resolution: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rejection_patterns: strings(&[
                r"\bunfortunately\b",
                r"regret to inform",
                r"not (be )?moving forward",
                r"not selected",
                r"not (been )?chosen",
                r"decided not to proceed",
                r"(position|role) has been filled",
                r"pursuing other candidates",
                r"gone with another candidate",
                r"(unable|not able) to offer",
                r"will not be offering",
                r"application (was|has been) unsuccessful",
                r"after careful (consideration|review).{0,100}(not|decided|unfortunately)",
            ]),
            interview_patterns: strings(&[
                r"schedule (an? )?(phone |video |virtual |in-person )?interview",
                r"interview (with|at|for)",
                r"interview (invitation|request)",
                r"schedule (a |an )?(call|chat|meeting)",
                r"invit(e|ing) you (to|for)",
                r"would you be available",
                r"set up (a |an )?(time|call|meeting|interview)",
                r"book (a |an )?(time|slot|interview)",
                r"next (step|stage|round)",
                r"like to (speak|talk|chat|meet) with you",
                r"calendly\.com",
                r"(pick|select|choose) a time",
            ]),
            offer_patterns: strings(&[
                r"offer (letter|of employment)",
                r"(pleased|happy|excited) to (offer|extend)",
                r"extend (an |a )?(job )?offer",
                r"offer you (the |a )?(position|role|job)",
                r"congratulations.{0,50}(offer|position)",
                r"terms of (employment|your offer)",
                r"compensation (package|details)",
            ]),
            confirmation_patterns: strings(&[
                r"application (received|submitted)",
                r"(thank you|thanks) for applying",
                r"application confirmation",
                r"we('ve| have) received your application",
                r"received your application",
                r"your application (has been|was) (received|submitted|sent)",
                r"successfully (submitted|applied)",
                r"thank you for your (application|interest)",
            ]),
            outreach_patterns: strings(&[
                r"(came across|found|saw|noticed) your (profile|resume|background|linkedin)",
                r"i('m| am) reaching out",
                r"wanted to reach out",
                r"you('d| would) be a (great|perfect|ideal|excellent) (fit|candidate|match)",
                r"(exciting|new) opportunity",
                r"open (role|position|opportunity)",
                r"are you (open to|interested in|looking for)",
                r"would you be (open to|interested in)",
                r"on behalf of (my |our )?client",
                r"my client (is|has)",
                r"your (background|experience|skills) (caught|stood out|impressed|align)",
                r"currently (looking|open|exploring)",
            ]),
            outreach_min_hits: 2,
            ats_domains: strings(&[
                "greenhouse.io",
                "greenhouse-mail.io",
                "lever.co",
                "hire.lever.co",
                "workday.com",
                "myworkdayjobs.com",
                "icims.com",
                "smartrecruiters.com",
                "ashbyhq.com",
                "bamboohr.com",
                "jobvite.com",
                "taleo.net",
                "workable.com",
                "workablemail.com",
                "breezy.hr",
                "applytojob.com",
                "zohorecruit.com",
                "indeed.com",
                "indeedemail.com",
                "linkedin.com",
                "joinhandshake.com",
            ]),
            confidence_threshold: 0.5,
            lookback_days: 30,
            scan_limit: 200,
            strict_resolution: false,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
