//! Content-type-specific check
//!
//! Single rules gated on the content type, layered beyond the generic
//! disclaimer set. The tax and legal referral rules deliberately overlap the
//! disclaimer addenda; both checks may flag the same omission.

use crate::models::{
    CheckFindings, CheckResult, ContentType, Issue, Severity, ValidationRequest,
};
use crate::taxonomy::CompiledTaxonomy;
use crate::validators::contains_any;

const SUITABILITY_REQUIREMENT: &str =
    "Must consider client's risk tolerance, time horizon, and financial situation";
const TAX_REFERRAL_REQUIREMENT: &str = "Must direct users to consult tax professionals/CPAs";
const LEGAL_REFERRAL_REQUIREMENT: &str = "Must direct users to consult licensed attorneys";

pub fn check(request: &ValidationRequest, taxonomy: &CompiledTaxonomy) -> CheckResult {
    let text = request.text.to_lowercase();
    let mut issues = Vec::new();

    match request.content_type {
        ContentType::InvestmentAdvice => {
            if !contains_any(&text, &taxonomy.suitability_terms) {
                issues.push(Issue::new(
                    Severity::High,
                    "suitability",
                    "Investment advice lacks suitability considerations",
                    SUITABILITY_REQUIREMENT,
                ));
            }
        }
        ContentType::TaxAdvice => {
            if !referral_present(&text, taxonomy, request.content_type) {
                issues.push(Issue::new(
                    Severity::Critical,
                    "tax_advice",
                    "Tax advice without proper disclaimer",
                    TAX_REFERRAL_REQUIREMENT,
                ));
            }
        }
        ContentType::LegalAdvice => {
            if !referral_present(&text, taxonomy, request.content_type) {
                issues.push(Issue::new(
                    Severity::Critical,
                    "legal_advice",
                    "Legal advice without proper disclaimer",
                    LEGAL_REFERRAL_REQUIREMENT,
                ));
            }
        }
        _ => {}
    }

    CheckResult {
        passed: issues.is_empty(),
        issues,
        findings: CheckFindings::TypeSpecific {},
    }
}

fn referral_present(text: &str, taxonomy: &CompiledTaxonomy, content_type: ContentType) -> bool {
    taxonomy
        .referral_for(content_type)
        .map(|referral| contains_any(text, &referral.keywords))
        .unwrap_or(true)
}
