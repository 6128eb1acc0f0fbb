//! Risk-disclosure check
//!
//! Investment-related content must name enough distinct risk types. The
//! `missing_risks` list is populated only when the check fails; a passing
//! response is not asked to enumerate what else it could have mentioned.

use crate::models::{CheckFindings, CheckResult, ValidationRequest};
use crate::taxonomy::CompiledTaxonomy;

const STRICT_MINIMUM: usize = 3;
const RELAXED_MINIMUM: usize = 1;

pub fn check(request: &ValidationRequest, taxonomy: &CompiledTaxonomy) -> CheckResult {
    let text = request.text.to_lowercase();

    let mut disclosed_risks = Vec::new();
    let mut missing = Vec::new();
    for risk_type in &taxonomy.risk_types {
        if text.contains(risk_type.as_str()) {
            disclosed_risks.push(risk_type.clone());
        } else {
            missing.push(risk_type.clone());
        }
    }

    let minimum_required = if request.strict {
        STRICT_MINIMUM
    } else {
        RELAXED_MINIMUM
    };
    let passed = disclosed_risks.len() >= minimum_required;

    CheckResult {
        passed,
        issues: Vec::new(),
        findings: CheckFindings::RiskDisclosure {
            disclosure_count: disclosed_risks.len(),
            missing_risks: if passed { Vec::new() } else { missing },
            disclosed_risks,
            minimum_required,
        },
    }
}
