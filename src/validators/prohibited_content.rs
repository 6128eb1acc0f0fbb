//! Prohibited-content check
//!
//! Scans the response against every pattern in every prohibited category and
//! reports each match as a critical violation with the matched substring and
//! a fixed-width evidence window for audit review. A single match anywhere
//! forces rejection.

use crate::models::{CheckFindings, CheckResult, Issue, Severity, ValidationRequest};
use crate::taxonomy::CompiledTaxonomy;

const REGULATION: &str = "SEC/FINRA regulations prohibit guarantees and misleading statements";

/// Characters kept on each side of a match in the evidence window.
pub const DEFAULT_CONTEXT_WINDOW: usize = 30;

pub fn check(
    request: &ValidationRequest,
    taxonomy: &CompiledTaxonomy,
    context_window: usize,
) -> CheckResult {
    let text = request.text.as_str();
    let mut issues = Vec::new();

    for category in &taxonomy.prohibited {
        for rule in &category.rules {
            for found in rule.regex.find_iter(text) {
                if is_excepted(text, found.end(), &rule.not_followed_by) {
                    continue;
                }
                let context = evidence_window(text, found.start(), found.end(), context_window);
                issues.push(
                    Issue::new(
                        Severity::Critical,
                        category.category.clone(),
                        "Prohibited content pattern matched",
                        REGULATION,
                    )
                    .with_evidence(rule.source.clone(), found.as_str(), context),
                );
            }
        }
    }

    CheckResult {
        passed: issues.is_empty(),
        findings: CheckFindings::Prohibited {
            violations_detected: issues.len(),
        },
        issues,
    }
}

/// Qualifier-exception suppression: the match is dropped when the text right
/// after it begins with one of the rule's exception words.
fn is_excepted(text: &str, match_end: usize, exceptions: &[String]) -> bool {
    let rest = &text[match_end..];
    exceptions.iter().any(|word| {
        rest.get(..word.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(word))
    })
}

/// Evidence window around a match, clipped to the text and to char
/// boundaries, whitespace-trimmed.
fn evidence_window(text: &str, start: usize, end: usize, window: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[from..to].trim().to_string()
}
