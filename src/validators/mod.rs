//! Independent compliance validators
//!
//! Each validator is a pure function `(request, taxonomy) -> CheckResult`.
//! Validators never call one another and share no state; the engine composes
//! their results into one verdict.

pub mod ai_disclosure;
pub mod content_type_specific;
pub mod prohibited_content;
pub mod required_disclaimers;
pub mod risk_disclosure;

/// Keyword membership over a lowercased haystack. Terms come from the
/// compiled taxonomy, already lowercased.
pub(crate) fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| haystack.contains(term.as_str()))
}
