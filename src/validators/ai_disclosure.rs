//! AI-disclosure check
//!
//! A compliant response admits it is AI-generated, acknowledges the
//! probabilistic nature of AI output, and points the reader at a licensed
//! professional. Detection is keyword membership against the taxonomy's
//! disclosure term lists.

use crate::models::{CheckFindings, CheckResult, Issue, Severity, ValidationRequest};
use crate::taxonomy::CompiledTaxonomy;
use crate::validators::contains_any;

const AI_MENTION_REQUIREMENT: &str = "Must disclose that response is AI-generated";
const PROBABILISTIC_REQUIREMENT: &str =
    "Must warn that AI systems are probabilistic and can make mistakes";
const PROFESSIONAL_REQUIREMENT: &str = "Must advise users to consult licensed professionals";

/// The probabilistic-nature disclosure is only gating under strict mode; the
/// AI mention and professional-consultation warning always are.
pub fn check(request: &ValidationRequest, taxonomy: &CompiledTaxonomy) -> CheckResult {
    let text = request.text.to_lowercase();
    let terms = &taxonomy.disclosure;

    let has_ai_mention = contains_any(&text, &terms.ai_terms);
    let has_probabilistic_warning = contains_any(&text, &terms.probabilistic_terms);
    let has_professional_advice_warning = contains_any(&text, &terms.professional_terms);

    let passed = has_ai_mention
        && (has_probabilistic_warning || !request.strict)
        && has_professional_advice_warning;

    let mut issues = Vec::new();
    if !has_ai_mention {
        issues.push(Issue::new(
            Severity::Critical,
            "ai_disclosure",
            "Missing AI system disclosure",
            AI_MENTION_REQUIREMENT,
        ));
    }
    if !has_probabilistic_warning && request.strict {
        issues.push(Issue::new(
            Severity::Critical,
            "ai_disclosure",
            "Missing probabilistic nature disclosure",
            PROBABILISTIC_REQUIREMENT,
        ));
    }
    if !has_professional_advice_warning {
        issues.push(Issue::new(
            Severity::High,
            "ai_disclosure",
            "Missing professional advice consultation warning",
            PROFESSIONAL_REQUIREMENT,
        ));
    }

    CheckResult {
        passed,
        issues,
        findings: CheckFindings::Disclosure {
            has_ai_mention,
            has_probabilistic_warning,
            has_professional_advice_warning,
        },
    }
}
