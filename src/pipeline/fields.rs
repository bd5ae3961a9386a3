//! Company and position extraction.
//!
//! Recovers the (company, position) pair that keys application records.
//! Extraction walks pattern tables in reliability order: explicit body
//! phrasing first, then subject phrasing, then the sender display name,
//! then response-email phrasing, with the sender domain as a last resort.
//! Every candidate is cleaned and validated before it is accepted —
//! confirmation emails are full of capitalized fragments that look like
//! names but are not.
//!
//! These tables are intrinsic heuristics over natural language, not tuning
//! knobs, so they live here rather than in `EngineConfig`.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::types::{ExtractedFields, NormalizedMessage};

/// How much of a body the pattern walk inspects.
const BODY_SCAN_CHARS: usize = 5000;
const EXPLICIT_SCAN_CHARS: usize = 3000;

fn table(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Explicit body phrases. Unambiguous — tried before anything else.
static EXPLICIT_BODY_COMPANY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"(?i:application with)\s+([A-Z][A-Za-z0-9 &.'-]+?)[.!,]",
        r"(?i:thank(?:s| you) for (?:your )?interest in)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:[.!,]|\s+[Ww]e)",
    ])
});

/// Subject-line company phrases.
static SUBJECT_COMPANY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"^(?i:thank(?:s| you) for applying to)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:\s*[—–]|!|\.?\s*$)",
        r"(?i:interest in)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:!|\s*$)",
        // Deliberately case-sensitive: "Acme Application Update", not
        // "your application status".
        r"^([A-Z][A-Za-z0-9 &.-]+?)\s+Application\s+(?:Update|Status|Confirmation)",
        r"(?i:application (?:to|at|with))\s+([A-Z][A-Za-z0-9 &.-]+?)(?:!|\.|\s*$)",
        r"@\s*([A-Z][A-Za-z0-9 &.-]+?)\s*$",
        r"\s(?i:at)\s+([A-Z][A-Za-z0-9 &.-]+?)(?:\s*$|!|\.)",
    ])
});

/// Body company phrases, broader than the explicit set.
static BODY_COMPANY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"(?i:thank(?:s| you) for (?:applying|your application) (?:to|at))\s+([A-Z][A-Za-z0-9 &.'-]+?)[.!,]",
        r"(?i:application (?:to|at|with))\s+([A-Z][A-Za-z0-9 &.-]+?)\s+(?i:has been|was|is)",
        r"(?i:applied (?:to|at))\s+([A-Z][A-Za-z0-9 &.-]+?)(?:[.!]|\s+(?i:on|for))",
        r"(?i:received your application).{0,80}?(?i: at| to)\s+([A-Z][A-Za-z0-9 &.-]+?)[.!]",
    ])
});

/// Phrases common in rejection/interview/offer emails.
static RESPONSE_COMPANY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"(?i:update from)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:\s*$|[.!,])",
        r"(?i:your application (?:to|at|with))\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:\s+(?i:has|was)|[.!,]|\s*$)",
        r"(?i:the (?:hiring |recruiting )?team at)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:\s*$|[.!,])",
        r"(?i:on behalf of)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:\s*$|[.!,])",
        r"(?i:we at)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:\s|[.!,])",
        r"(?i:(?:role|position) at)\s+([A-Z][A-Za-z0-9 &.'-]+?)(?:\s*$|[.!,])",
    ])
});

/// Position phrases that only make sense in a subject line.
static SUBJECT_POSITION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"(?i:application (?:update|status|confirmation)):\s*(.+?)\s*$",
        r"^(?i:thank(?:s| you) for applying to)\s+.+?\s[—–-]\s(.+?)\s*$",
        r"^(.+?)\s*@\s*[A-Z]",
        r"^(.+?)\s+(?i:at)\s+[A-Z]",
        r"(?i:applying to)\s+(.+?)(?:\s+-\s+|\s+(?i:at)\s+|\s*$)",
    ])
});

/// Position phrases that work in subjects and bodies.
static BODY_POSITION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"(?i:following (?:role|position|job))(?:\(s\))?:\s*\n?\s*(.+?)(?:\s*\(|\n|$)",
        r"(?i:position of)\s+([A-Z][A-Za-z0-9 /-]+?)(?:[.,!]|\s+(?i:at|with)|\n)",
        r"(?i:interest in the)\s+(.+?)\s+(?i:position|role|opportunity)",
        r"(?i:applying (?:to|for) the)\s+(.+?)\s+(?i:position|role)",
        r"(?i:your application for the)\s+(.+?)\s+(?i:position|role)",
    ])
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[?https?://[^\s\]]*\]?").unwrap());
static ANGLE_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static CLEAN_CORP_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:,\s*)?\b(?:inc|llc|ltd|corp|corporation|company|co)\.?\s*$").unwrap()
});
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Fragments that disqualify a company candidate.
static BAD_COMPANY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"(?i)thank(s| you)",
        r"(?i)your application",
        r"(?i)has been",
        r"(?i)was received",
        r"(?i)we (have|are|received|will)",
        r"(?i)please",
        r"(?i)the position",
        r"(?i)this email",
        r"(?i)click here",
        r"(?i)log in",
        r"(?i)https?|www\.",
        r"(?i)hiring process",
        r"(?i)(hr|recruiting|talent) team",
        r"(?i)in the meantime",
        r"(?i)apply now",
        r"(?i)view job",
        r"(?i)^on \w+,",
        r"^\d{1,2}:\d{2}",
    ])
});

/// Fragments that disqualify a position candidate.
static BAD_POSITION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    table(&[
        r"(?i)^the\s",
        r"(?i)^our\s",
        r"(?i)^of\s",
        r"(?i)https?|www\.",
        r"@",
        r"(?i)\.com",
        r"(?i)click here",
        r"(?i)your (application|resume|recent)",
        r"(?i)this email",
        r"(?i)thank(s| you)",
        r"(?i)hiring process",
        r"(?i)status of",
        r"(?i)^on \w+,",
        r"(?i)next steps",
    ])
});

const POSITION_KEYWORDS: &[&str] = &[
    "intern",
    "manager",
    "director",
    "engineer",
    "developer",
    "analyst",
    "specialist",
    "coordinator",
    "assistant",
    "associate",
    "representative",
    "recruiter",
    "designer",
    "scientist",
    "lead",
    "executive",
    "administrator",
    "consultant",
    "advisor",
    "officer",
    "technician",
    "operator",
    "supervisor",
    "architect",
];

const COMPANY_INDICATORS: &[&str] = &[
    "inc",
    "llc",
    "ltd",
    "corp",
    "group",
    "solutions",
    "services",
    "consulting",
    "technologies",
    "systems",
    "company",
    "studio",
    "media",
    "digital",
    "agency",
    "staffing",
    "partners",
    "associates",
    "labs",
    "energy",
    "college",
    "university",
    "hospital",
    "medical",
];

/// Sender display names that are platforms or shared mailboxes, never
/// companies.
const GENERIC_SENDER_NAMES: &[&str] = &[
    "indeed",
    "indeed apply",
    "linkedin",
    "linkedin jobs",
    "glassdoor",
    "ziprecruiter",
    "monster",
    "careerbuilder",
    "handshake",
    "greenhouse",
    "lever",
    "workday",
    "icims",
    "smartrecruiters",
    "workable",
    "jobvite",
    "taleo",
    "ashby",
    "bamboohr",
    "zoho",
    "breezy",
    "jazz",
    "noreply",
    "no-reply",
    "jobs",
    "careers",
    "recruiting",
    "talent",
    "hr",
    "team",
    "hiring",
    "notifications",
    "alerts",
    "updates",
    "candidates",
];

const PLATFORM_KEYWORDS: &[&str] = &[
    "indeed",
    "linkedin",
    "greenhouse",
    "lever",
    "workday",
    "icims",
    "smartrecruiters",
    "workable",
    "handshake",
    "jobvite",
    "taleo",
    "ashby",
    "bamboohr",
    "zoho",
    "glassdoor",
    "ziprecruiter",
    "monster",
    "careerbuilder",
];

/// Domains that never identify an employer.
const SKIP_DOMAINS: &[&str] = &[
    "indeed",
    "indeedemail",
    "linkedin",
    "handshake",
    "joinhandshake",
    "greenhouse",
    "lever",
    "workday",
    "myworkdayjobs",
    "icims",
    "smartrecruiters",
    "jobvite",
    "taleo",
    "ashbyhq",
    "workable",
    "workablemail",
    "bamboohr",
    "zoho",
    "zohorecruit",
    "breezy",
    "applytojob",
    "gmail",
    "outlook",
    "yahoo",
    "hotmail",
    "aol",
    "icloud",
    "live",
    "msn",
    "mail",
    "email",
    "noreply",
    "notifications",
    "candidates",
];

/// Extracts (company, position) from normalized messages.
#[derive(Debug, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, message: &NormalizedMessage) -> ExtractedFields {
        ExtractedFields {
            company: self.extract_company(message),
            position: self.extract_position(message),
        }
    }

    fn extract_company(&self, message: &NormalizedMessage) -> Option<String> {
        let subject = message.raw.subject.trim();
        let body = &message.body_clean;

        first_company_match(&EXPLICIT_BODY_COMPANY, head(body, EXPLICIT_SCAN_CHARS))
            .or_else(|| first_company_match(&SUBJECT_COMPANY, subject))
            .or_else(|| company_from_sender_name(message.raw.sender_name.as_deref()))
            .or_else(|| first_company_match(&BODY_COMPANY, head(body, BODY_SCAN_CHARS)))
            .or_else(|| first_company_match(&RESPONSE_COMPANY, subject))
            .or_else(|| first_company_match(&RESPONSE_COMPANY, head(body, BODY_SCAN_CHARS)))
            .or_else(|| company_from_domain(&message.sender_domain))
    }

    fn extract_position(&self, message: &NormalizedMessage) -> Option<String> {
        let subject = message.raw.subject.trim();
        let body = head(&message.body_clean, EXPLICIT_SCAN_CHARS);

        first_position_match(&SUBJECT_POSITION, subject)
            .or_else(|| first_position_match(&BODY_POSITION, subject))
            .or_else(|| first_position_match(&BODY_POSITION, body))
    }
}

fn first_company_match(patterns: &[Regex], text: &str) -> Option<String> {
    for pattern in patterns {
        if let Some(captures) = pattern.captures(text) {
            let candidate = clean_company(captures.get(1).map_or("", |m| m.as_str()));
            if looks_like_company(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn first_position_match(patterns: &[Regex], text: &str) -> Option<String> {
    for pattern in patterns {
        if let Some(captures) = pattern.captures(text) {
            let candidate = clean_position(captures.get(1).map_or("", |m| m.as_str()));
            if looks_like_position(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Company from the sender display name, e.g. `"Acme Careers" <x@y>`.
fn company_from_sender_name(sender_name: Option<&str>) -> Option<String> {
    let mut name = sender_name?.trim().trim_matches(['"', '\'']).to_string();

    // "TEKsystems @ icims" style: keep the employer half.
    if let Some((first, _)) = name.split_once(" @ ") {
        name = first.trim().to_string();
    }

    let lower = name.to_lowercase();
    if name.len() <= 2
        || GENERIC_SENDER_NAMES.contains(&lower.as_str())
        || PLATFORM_KEYWORDS.iter().any(|p| lower.contains(p))
    {
        return None;
    }

    let cleaned = clean_company(&name);
    looks_like_company(&cleaned).then_some(cleaned)
}

/// Last resort: derive a company from the sender domain's first label.
/// Bails out when any label belongs to a platform or freemail provider.
fn company_from_domain(domain: &str) -> Option<String> {
    if domain.split('.').any(|l| SKIP_DOMAINS.contains(&l)) {
        return None;
    }
    let label = domain.split('.').next().unwrap_or_default();
    if label.len() <= 2 {
        return None;
    }
    Some(title_case(&label.replace(['-', '_'], " ")))
}

fn clean_company(raw: &str) -> String {
    let without_urls = URL.replace_all(raw, "");
    let without_angles = ANGLE_FRAGMENT.replace_all(&without_urls, "");
    let collapsed = SPACES.replace_all(without_angles.trim(), " ");
    let stripped = CLEAN_CORP_SUFFIX.replace(&collapsed, "");
    let stripped = stripped.trim();
    let stripped = stripped
        .strip_prefix("The ")
        .or_else(|| stripped.strip_prefix("the "))
        .unwrap_or(stripped);
    stripped
        .trim_matches(|c: char| c.is_whitespace() || ".,!?:;-".contains(c))
        .to_string()
}

fn clean_position(raw: &str) -> String {
    let collapsed = SPACES.replace_all(raw.trim(), " ");
    let mut cleaned = collapsed
        .trim_matches(|c: char| c.is_whitespace() || ".,!?:;-".contains(c))
        .to_string();
    for noise in ["position", "role", "opportunity", "job", "the"] {
        // Byte offsets from the lowercase copy only transfer when
        // lowercasing did not change lengths.
        let lower = cleaned.to_lowercase();
        if lower.len() == cleaned.len() {
            if let Some(rest) = lower.strip_prefix(&format!("{noise} ")) {
                cleaned = cleaned[cleaned.len() - rest.len()..].to_string();
            }
        }
        let lower = cleaned.to_lowercase();
        if lower.len() == cleaned.len() {
            if let Some(rest) = lower.strip_suffix(&format!(" {noise}")) {
                cleaned = cleaned[..rest.len()].to_string();
            }
        }
    }
    cleaned.trim().to_string()
}

fn looks_like_company(text: &str) -> bool {
    if text.len() < 2 || text.len() > 80 {
        return false;
    }
    if !text.starts_with(|c: char| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return false;
    }

    let lower = text.to_lowercase();
    if GENERIC_SENDER_NAMES.contains(&lower.as_str()) {
        return false;
    }
    if ["your", "my", "our", "the", "this", "new", "all"].contains(&lower.as_str()) {
        return false;
    }
    if PLATFORM_KEYWORDS.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    if BAD_COMPANY.iter().any(|r| r.is_match(&lower)) {
        return false;
    }

    let has_indicator = COMPANY_INDICATORS.iter().any(|i| lower.contains(i));

    // A job title is not a company unless a corporate word says otherwise.
    if POSITION_KEYWORDS.iter().any(|k| lower.contains(k)) && !has_indicator {
        return false;
    }

    // "Jane Doe" shapes without a corporate word are person names.
    let words: Vec<&str> = text.split_whitespace().collect();
    if (words.len() == 2 || words.len() == 3) && !has_indicator {
        let all_name_like = words.iter().all(|w| {
            w.len() > 1
                && w.starts_with(|c: char| c.is_ascii_uppercase())
                && w[1..].chars().all(|c| c.is_ascii_lowercase())
        });
        if all_name_like {
            return false;
        }
    }

    true
}

fn looks_like_position(text: &str) -> bool {
    if text.len() < 3 || text.len() > 100 {
        return false;
    }

    let lower = text.to_lowercase();

    // A recognized title word is decisive.
    if POSITION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    if BAD_POSITION.iter().any(|r| r.is_match(text)) {
        return false;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    // A single capitalized word without a title keyword is a company.
    if words.len() == 1 {
        return false;
    }
    // "Jane Doe" shapes are people.
    if words.len() == 2
        && words.iter().all(|w| {
            w.len() > 1
                && w.starts_with(|c: char| c.is_ascii_uppercase())
                && w[1..].chars().all(|c| c.is_ascii_lowercase())
        })
    {
        return false;
    }

    true
}

/// Title-case each whitespace-separated word.
pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Char-boundary-safe prefix of at most `max_chars` characters.
fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
