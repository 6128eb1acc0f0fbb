//! Required-disclaimers check
//!
//! Four general disclaimer categories plus content-type addenda (tax and
//! legal limitations). Missing categories are omissions, not violations:
//! they flow into the report's `missing_elements`, never into
//! `issues_found`, so they drive modification rather than rejection.

use crate::models::{CheckFindings, CheckResult, ValidationRequest};
use crate::taxonomy::CompiledTaxonomy;
use crate::validators::contains_any;

/// Relaxed mode passes with at least this many general categories present.
const RELAXED_MINIMUM_PRESENT: usize = 2;

pub fn check(request: &ValidationRequest, taxonomy: &CompiledTaxonomy) -> CheckResult {
    let text = request.text.to_lowercase();

    let mut present = Vec::new();
    let mut missing = Vec::new();
    for category in &taxonomy.disclaimers {
        if contains_any(&text, &category.keywords) {
            present.push(category.category.clone());
        } else {
            missing.push(category.category.clone());
        }
    }

    // Relaxed mode counts general categories only; addenda are still
    // recorded as missing but do not gate.
    let general_present = present.len();

    for addendum in taxonomy.addenda_for(request.content_type) {
        if !contains_any(&text, &addendum.keywords) {
            missing.push(addendum.element.clone());
        }
    }

    let passed = if request.strict {
        missing.is_empty()
    } else {
        general_present >= RELAXED_MINIMUM_PRESENT
    };

    CheckResult {
        passed,
        issues: Vec::new(),
        findings: CheckFindings::Disclaimers {
            present,
            missing,
            total_required: taxonomy.disclaimers.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use crate::validators::test_support::compiled_builtin;

    const ALL_DISCLAIMERS: &str =
        "This AI answer is for educational purposes only and does not constitute advice; \
         speak with a licensed financial advisor, and remember all investing carries risk.";

    #[test]
    fn all_categories_present_passes_strict() {
        let taxonomy = compiled_builtin();
        let request = ValidationRequest::new(ALL_DISCLAIMERS, ContentType::GeneralInfo);
        let result = check(&request, &taxonomy);
        assert!(result.passed);
        match result.findings {
            CheckFindings::Disclaimers {
                present,
                missing,
                total_required,
            } => {
                assert_eq!(present.len(), 4);
                assert!(missing.is_empty());
                assert_eq!(total_required, 4);
            }
            other => panic!("unexpected findings: {other:?}"),
        }
    }

    #[test]
    fn two_categories_pass_relaxed_but_fail_strict() {
        let taxonomy = compiled_builtin();
        // ai_disclosure ("ai") and risk_warning ("risk") only.
        let text = "An AI wrote this; markets involve risk.";

        let strict = check(
            &ValidationRequest::new(text, ContentType::GeneralInfo),
            &taxonomy,
        );
        assert!(!strict.passed);

        let relaxed = check(
            &ValidationRequest::relaxed(text, ContentType::GeneralInfo),
            &taxonomy,
        );
        assert!(relaxed.passed);
    }

    #[test]
    fn missing_categories_are_reported_by_name() {
        let taxonomy = compiled_builtin();
        let request = ValidationRequest::new("An AI wrote this.", ContentType::GeneralInfo);
        let result = check(&request, &taxonomy);
        match result.findings {
            CheckFindings::Disclaimers { missing, .. } => {
                assert_eq!(
                    missing,
                    vec!["general_disclaimer", "professional_advice", "risk_warning"]
                );
            }
            other => panic!("unexpected findings: {other:?}"),
        }
    }

    #[test]
    fn tax_advice_requires_tax_professional_phrase() {
        let taxonomy = compiled_builtin();
        let request = ValidationRequest::new(ALL_DISCLAIMERS, ContentType::TaxAdvice);
        let result = check(&request, &taxonomy);
        assert!(!result.passed);
        match result.findings {
            CheckFindings::Disclaimers { missing, .. } => {
                assert_eq!(missing, vec!["tax_advice_limitation"]);
            }
            other => panic!("unexpected findings: {other:?}"),
        }

        let satisfied = format!("{ALL_DISCLAIMERS} Ask a tax professional about your situation.");
        let result = check(
            &ValidationRequest::new(satisfied, ContentType::TaxAdvice),
            &taxonomy,
        );
        assert!(result.passed);
    }

    #[test]
    fn legal_advice_addendum_accepts_either_keyword() {
        let taxonomy = compiled_builtin();
        let with_attorney = format!("{ALL_DISCLAIMERS} Contact an attorney for specifics.");
        let result = check(
            &ValidationRequest::new(with_attorney, ContentType::LegalAdvice),
            &taxonomy,
        );
        assert!(result.passed);
    }

    #[test]
    fn addendum_does_not_gate_relaxed_mode() {
        let taxonomy = compiled_builtin();
        // Two general categories present, tax addendum missing.
        let text = "An AI wrote this; markets involve risk.";
        let result = check(
            &ValidationRequest::relaxed(text, ContentType::TaxAdvice),
            &taxonomy,
        );
        assert!(result.passed);
        match result.findings {
            CheckFindings::Disclaimers { missing, .. } => {
                assert!(missing.contains(&"tax_advice_limitation".to_string()));
            }
            other => panic!("unexpected findings: {other:?}"),
        }
    }
}
