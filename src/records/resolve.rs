//! Resolution — mapping a classified event to a specific application.
//!
//! Ambiguous matching is the most likely source of user-visible
//! misclassification, so the fallback path is deliberately narrow: a
//! response event resolves by company alone only when exactly one open
//! application matches, and strict mode disables even that.

use serde::Serialize;

use crate::records::{Application, normalize_company, normalize_position};

/// Why a response event could not be resolved to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No company could be extracted from the message.
    NoCompany,
    /// No open application matches the company.
    NoCandidates,
    /// More than one open application matches the company and none
    /// matches the position exactly.
    Ambiguous { candidates: usize },
}

/// Outcome of resolving an event against the owner's applications.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// The event belongs to this existing application.
    Existing(&'a Application),
    /// No identity match — a new record should be created.
    CreateNew,
    /// Nothing is mutated; the event goes to the report for manual review.
    Unresolved(UnresolvedReason),
}

/// Resolve a `NewApplication` event by identity key. An existing
/// application with the same (normalized company, normalized position)
/// means no new record — the caller refreshes it instead.
pub fn resolve_new_application<'a>(
    applications: &'a [Application],
    company: &str,
    position: &str,
) -> Resolution<'a> {
    let key = (normalize_company(company), normalize_position(position));
    match applications.iter().find(|a| a.identity_key() == key) {
        Some(app) => Resolution::Existing(app),
        None => Resolution::CreateNew,
    }
}

/// Resolve a response event (rejection, interview request, offer).
///
/// Tries an exact (company, position) identity match first, then — unless
/// `strict` — a single-candidate fuzzy match by company among the owner's
/// open applications. Zero or multiple candidates resolve to `Unresolved`
/// so the wrong record is never mutated. A lone terminal match still
/// resolves: the state machine turns it into a reported no-op instead of
/// flooding the review queue with mail about settled applications.
pub fn resolve_response<'a>(
    applications: &'a [Application],
    company: Option<&str>,
    position: Option<&str>,
    strict: bool,
) -> Resolution<'a> {
    let Some(company) = company else {
        return Resolution::Unresolved(UnresolvedReason::NoCompany);
    };
    let company_norm = normalize_company(company);
    if company_norm.is_empty() {
        return Resolution::Unresolved(UnresolvedReason::NoCompany);
    }

    if let Some(position) = position {
        let position_norm = normalize_position(position);
        if let Some(app) = applications.iter().find(|a| {
            let (c, p) = a.identity_key();
            c == company_norm && p == position_norm
        }) {
            return Resolution::Existing(app);
        }
    }

    if strict {
        return Resolution::Unresolved(UnresolvedReason::NoCandidates);
    }

    // Fuzzy company match, substring in either direction over normalized
    // names. Open applications take precedence; terminal ones only matter
    // when nothing is open.
    let fuzzy = |a: &&Application| {
        let app_company = normalize_company(&a.company);
        !app_company.is_empty()
            && (app_company.contains(&company_norm) || company_norm.contains(&app_company))
    };
    let open: Vec<&Application> = applications
        .iter()
        .filter(|a| !a.status.is_terminal())
        .filter(fuzzy)
        .collect();

    match open.len() {
        1 => Resolution::Existing(open[0]),
        0 => {
            let terminal: Vec<&Application> = applications
                .iter()
                .filter(|a| a.status.is_terminal())
                .filter(fuzzy)
                .collect();
            match terminal.len() {
                1 => Resolution::Existing(terminal[0]),
                0 => Resolution::Unresolved(UnresolvedReason::NoCandidates),
                n => Resolution::Unresolved(UnresolvedReason::Ambiguous { candidates: n }),
            }
        }
        n => Resolution::Unresolved(UnresolvedReason::Ambiguous { candidates: n }),
    }
}
