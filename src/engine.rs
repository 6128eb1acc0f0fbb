//! Compliance engine: runs the validators and aggregates one verdict
//!
//! Rules-based gating before final output. Deterministic enforcement: the
//! verdict is a pure function of the request and the compiled policy.
//!
//! Precedence is strict: a failed AI-disclosure or prohibited-content check
//! rejects outright; otherwise any missing element requires modification;
//! otherwise the response is approved. Evaluation never unwinds into the
//! caller; an unexpected fault becomes an `ERROR` report the caller must
//! treat as not-approved.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::Result;
use crate::models::{CheckFindings, ComplianceReport, OverallStatus, ValidationRequest};
use crate::taxonomy::{CompiledTaxonomy, Taxonomy, DEFAULT_TAXONOMY};
use crate::validators::{
    ai_disclosure, content_type_specific, prohibited_content, required_disclaimers,
    risk_disclosure,
};

// Check names in `checks_performed`
pub const CHECK_AI_DISCLOSURE: &str = "ai_disclosure";
pub const CHECK_PROHIBITED_CONTENT: &str = "prohibited_content";
pub const CHECK_REQUIRED_DISCLAIMERS: &str = "required_disclaimers";
pub const CHECK_RISK_DISCLOSURE: &str = "risk_disclosure";
pub const CHECK_CONTENT_TYPE_SPECIFIC: &str = "content_type_specific";

const REJECTED_RECOMMENDATION: &str = "CRITICAL: Response contains critical compliance \
     violations and must be rejected or significantly modified.";
const MODIFICATION_RECOMMENDATION: &str =
    "Response requires modifications to add missing compliance elements.";
const APPROVED_RECOMMENDATION: &str = "Response meets compliance requirements.";
const ERROR_RECOMMENDATION: &str = "Manual review required due to validation error";
const MISSING_AI_DISCLOSURE_ELEMENT: &str = "AI disclosure statement";

/// The compliance gate. Holds the compiled policy; stateless across calls
/// and safe to share between threads.
pub struct ComplianceEngine {
    taxonomy: Arc<CompiledTaxonomy>,
    context_window: usize,
}

impl ComplianceEngine {
    /// Engine over the built-in policy.
    pub fn new() -> Self {
        Self {
            taxonomy: Arc::clone(&DEFAULT_TAXONOMY),
            context_window: prohibited_content::DEFAULT_CONTEXT_WINDOW,
        }
    }

    /// Engine over a custom policy document.
    pub fn with_taxonomy(taxonomy: Taxonomy) -> Result<Self> {
        Ok(Self {
            taxonomy: Arc::new(taxonomy.compile()?),
            context_window: prohibited_content::DEFAULT_CONTEXT_WINDOW,
        })
    }

    /// Width of the evidence window captured around prohibited matches.
    /// Downstream review tooling assumes the default of 30.
    pub fn with_context_window(mut self, chars: usize) -> Self {
        self.context_window = chars;
        self
    }

    /// Evaluate one candidate response. Total: always returns a report.
    pub fn evaluate(&self, request: &ValidationRequest) -> ComplianceReport {
        self.evaluate_at(request, Utc::now())
    }

    /// Like `evaluate`, with the report's informational timestamp supplied
    /// by the caller. For identical inputs the report is byte-identical.
    pub fn evaluate_at(
        &self,
        request: &ValidationRequest,
        validated_at: DateTime<Utc>,
    ) -> ComplianceReport {
        info!(
            response_type = request.content_type.label(),
            strict = request.strict,
            "Running compliance validation"
        );

        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.run_checks(request, validated_at)));

        match outcome {
            Ok(report) => {
                info!(status = %report.overall_status, "Compliance validation completed");
                report
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(error = %message, "Compliance validation failed");
                self.error_report(request, message, validated_at)
            }
        }
    }

    fn run_checks(
        &self,
        request: &ValidationRequest,
        validated_at: DateTime<Utc>,
    ) -> ComplianceReport {
        let mut issues_found = Vec::new();
        let mut missing_elements = Vec::new();

        let ai = ai_disclosure::check(request, &self.taxonomy);
        if !ai.passed {
            issues_found.extend(ai.issues.iter().cloned());
            missing_elements.push(MISSING_AI_DISCLOSURE_ELEMENT.to_string());
        }

        let prohibited = prohibited_content::check(request, &self.taxonomy, self.context_window);
        if !prohibited.passed {
            issues_found.extend(prohibited.issues.iter().cloned());
        }

        let disclaimers = required_disclaimers::check(request, &self.taxonomy);
        if !disclaimers.passed {
            if let CheckFindings::Disclaimers { missing, .. } = &disclaimers.findings {
                missing_elements.extend(missing.iter().cloned());
            }
        }

        let risk = request
            .content_type
            .requires_risk_disclosure()
            .then(|| risk_disclosure::check(request, &self.taxonomy));
        if let Some(risk) = &risk {
            if !risk.passed {
                if let CheckFindings::RiskDisclosure { missing_risks, .. } = &risk.findings {
                    missing_elements.extend(missing_risks.iter().cloned());
                }
            }
        }

        let type_specific = content_type_specific::check(request, &self.taxonomy);
        if !type_specific.passed {
            issues_found.extend(type_specific.issues.iter().cloned());
        }

        // Only these two gates reject. Content-type-specific issues, even
        // critical ones, surface in issues_found without rejecting.
        let rejected = !ai.passed || !prohibited.passed;

        let overall_status = if rejected {
            OverallStatus::Rejected
        } else if !missing_elements.is_empty() {
            OverallStatus::RequiresModification
        } else {
            OverallStatus::Approved
        };

        let mut recommendations = vec![match overall_status {
            OverallStatus::Rejected => REJECTED_RECOMMENDATION,
            OverallStatus::RequiresModification => MODIFICATION_RECOMMENDATION,
            _ => APPROVED_RECOMMENDATION,
        }
        .to_string()];
        if !missing_elements.is_empty() {
            recommendations.push(format!(
                "Add the following elements: {}",
                missing_elements.join(", ")
            ));
        }

        let mut checks_performed = BTreeMap::new();
        checks_performed.insert(CHECK_AI_DISCLOSURE.to_string(), ai);
        checks_performed.insert(CHECK_PROHIBITED_CONTENT.to_string(), prohibited);
        checks_performed.insert(CHECK_REQUIRED_DISCLAIMERS.to_string(), disclaimers);
        if let Some(risk) = risk {
            checks_performed.insert(CHECK_RISK_DISCLOSURE.to_string(), risk);
        }
        checks_performed.insert(CHECK_CONTENT_TYPE_SPECIFIC.to_string(), type_specific);

        ComplianceReport {
            overall_status,
            response_type: request.content_type,
            strict_mode: request.strict,
            validated_at,
            checks_performed,
            issues_found,
            missing_elements,
            recommendations,
            error: None,
        }
    }

    fn error_report(
        &self,
        request: &ValidationRequest,
        message: String,
        validated_at: DateTime<Utc>,
    ) -> ComplianceReport {
        ComplianceReport {
            overall_status: OverallStatus::Error,
            response_type: request.content_type,
            strict_mode: request.strict,
            validated_at,
            checks_performed: BTreeMap::new(),
            issues_found: Vec::new(),
            missing_elements: Vec::new(),
            recommendations: vec![ERROR_RECOMMENDATION.to_string()],
            error: Some(message),
        }
    }

    /// Tool definition for agent integration. The orchestrating agent calls
    /// the gate once per candidate response and must treat any status other
    /// than APPROVED as "do not show verbatim".
    pub fn tool_definition() -> Value {
        json!({
            "name": "compliance_checklist",
            "description": "Validates financial advisory responses against comprehensive \
                compliance requirements. Checks for AI disclosures, prohibited content, \
                required disclaimers, regulatory compliance, and risk disclosure adequacy. \
                Returns structured compliance validation report with specific issues and \
                recommendations.",
            "parameters": {
                "type": "object",
                "properties": {
                    "response_text": {
                        "type": "string",
                        "description": "The financial advisory response to validate for compliance"
                    },
                    "response_type": {
                        "type": "string",
                        "description": "Type of financial content",
                        "enum": [
                            "investment_advice",
                            "general_info",
                            "product_explanation",
                            "market_analysis",
                            "tax_advice",
                            "legal_advice"
                        ]
                    },
                    "strict_mode": {
                        "type": "boolean",
                        "description": "If true, applies stricter validation criteria (default: true)",
                        "default": true
                    }
                },
                "required": ["response_text", "response_type"]
            }
        })
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unidentified evaluation fault".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, Severity};
    use chrono::TimeZone;

    // Satisfies AI disclosure, all four disclaimer categories, and mentions
    // exactly one risk type (loss of principal).
    const COMPLIANT_BASE: &str =
        "This response was generated by an AI system and is probabilistic in nature, so it \
         can make mistakes. It is provided for educational purposes only and does not \
         constitute financial advice. Please consult a licensed financial advisor before \
         acting on it. All investments carry risk, including possible loss of principal.";

    fn engine() -> ComplianceEngine {
        ComplianceEngine::new()
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn scenario_fully_disclosed_general_info_is_approved() {
        let request = ValidationRequest::new(COMPLIANT_BASE, ContentType::GeneralInfo);
        let report = engine().evaluate(&request);
        assert_eq!(report.overall_status, OverallStatus::Approved);
        assert!(report.is_approved());
        assert!(report.issues_found.is_empty());
        assert!(report.missing_elements.is_empty());
        assert_eq!(report.recommendations, vec![APPROVED_RECOMMENDATION]);
        assert_eq!(report.checks_performed.len(), 4);
        assert!(!report.checks_performed.contains_key(CHECK_RISK_DISCLOSURE));
    }

    #[test]
    fn scenario_guaranteed_profit_is_rejected() {
        let text = format!("{COMPLIANT_BASE} Our plan produces guaranteed profit.");
        let request = ValidationRequest::new(text, ContentType::GeneralInfo);
        let report = engine().evaluate(&request);
        assert_eq!(report.overall_status, OverallStatus::Rejected);
        assert!(report.has_critical_issue());
        assert_eq!(report.recommendations, vec![REJECTED_RECOMMENDATION]);
    }

    #[test]
    fn scenario_single_risk_type_requires_modification() {
        let request = ValidationRequest::new(COMPLIANT_BASE, ContentType::InvestmentAdvice);
        let report = engine().evaluate(&request);
        assert_eq!(report.overall_status, OverallStatus::RequiresModification);
        assert!(report
            .missing_elements
            .iter()
            .any(|element| element == "market risk"));
        assert!(report.checks_performed.contains_key(CHECK_RISK_DISCLOSURE));
        assert_eq!(report.recommendations.len(), 2);
        assert!(report.recommendations[1].starts_with("Add the following elements:"));
    }

    #[test]
    fn scenario_tax_advice_without_referral_requires_modification() {
        let request = ValidationRequest::new(COMPLIANT_BASE, ContentType::TaxAdvice);
        let report = engine().evaluate(&request);

        // The content-type check records a critical issue, but only the
        // AI-disclosure and prohibited-content gates reject.
        assert_eq!(report.overall_status, OverallStatus::RequiresModification);
        assert!(report.has_critical_issue());
        assert!(report
            .missing_elements
            .contains(&"tax_advice_limitation".to_string()));
    }

    #[test]
    fn missing_ai_disclosure_rejects_and_reports_missing_element() {
        let request = ValidationRequest::new(
            "Purely factual text with zero disclosures.",
            ContentType::GeneralInfo,
        );
        let report = engine().evaluate(&request);
        assert_eq!(report.overall_status, OverallStatus::Rejected);
        assert!(report
            .missing_elements
            .contains(&MISSING_AI_DISCLOSURE_ELEMENT.to_string()));
        // Rejected reports still enumerate what to add.
        assert!(report.recommendations[1].starts_with("Add the following elements:"));
    }

    #[test]
    fn three_risk_types_pass_strict_boundary() {
        let text = format!("{COMPLIANT_BASE} Mind market risk and general volatility too.");
        let request = ValidationRequest::new(text, ContentType::InvestmentAdvice);
        let report = engine().evaluate(&request);
        assert_eq!(report.overall_status, OverallStatus::Approved);

        // Suitability is still flagged, but as a non-gating HIGH issue.
        assert_eq!(report.issues_found.len(), 1);
        assert_eq!(report.issues_found[0].severity, Severity::High);
        assert_eq!(report.issues_found[0].category, "suitability");
    }

    #[test]
    fn two_risk_types_fail_strict_boundary() {
        let text = format!("{COMPLIANT_BASE} Mind market risk as well.");
        let request = ValidationRequest::new(text, ContentType::InvestmentAdvice);
        let report = engine().evaluate(&request);
        assert_eq!(report.overall_status, OverallStatus::RequiresModification);
    }

    #[test]
    fn evaluation_is_idempotent_and_byte_identical() {
        let request = ValidationRequest::new(COMPLIANT_BASE, ContentType::InvestmentAdvice);
        let engine = engine();
        let first = engine.evaluate_at(&request, stamp());
        let second = engine.evaluate_at(&request, stamp());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn relaxing_strictness_cannot_newly_reject_an_approved_response() {
        let strict = ValidationRequest::new(COMPLIANT_BASE, ContentType::GeneralInfo);
        let engine = engine();
        assert_eq!(
            engine.evaluate(&strict).overall_status,
            OverallStatus::Approved
        );

        let relaxed = ValidationRequest::relaxed(COMPLIANT_BASE, ContentType::GeneralInfo);
        assert_eq!(
            engine.evaluate(&relaxed).overall_status,
            OverallStatus::Approved
        );
    }

    #[test]
    fn prohibited_content_rejects_regardless_of_strictness() {
        let text = format!("{COMPLIANT_BASE} These bonds are risk-free returns.");
        let engine = engine();
        for request in [
            ValidationRequest::new(text.clone(), ContentType::GeneralInfo),
            ValidationRequest::relaxed(text, ContentType::GeneralInfo),
        ] {
            assert_eq!(
                engine.evaluate(&request).overall_status,
                OverallStatus::Rejected
            );
        }
    }

    #[test]
    fn report_serializes_to_the_boundary_contract() {
        let request = ValidationRequest::new(COMPLIANT_BASE, ContentType::GeneralInfo);
        let report = engine().evaluate_at(&request, stamp());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["overall_status"], "APPROVED");
        assert_eq!(value["response_type"], "general_info");
        assert!(value["checks_performed"].is_object());
        assert!(value["issues_found"].is_array());
        assert!(value["missing_elements"].is_array());
        assert!(value["recommendations"].is_array());
        assert!(value.get("error").is_none());
        assert_eq!(
            value["checks_performed"]["ai_disclosure"]["has_ai_mention"],
            true
        );
    }

    #[test]
    fn error_report_fails_closed_with_diagnostics() {
        let request = ValidationRequest::new("anything", ContentType::GeneralInfo);
        let report = engine().error_report(&request, "boom".to_string(), stamp());
        assert_eq!(report.overall_status, OverallStatus::Error);
        assert!(!report.is_approved());
        assert_eq!(report.error.as_deref(), Some("boom"));
        assert_eq!(report.recommendations, vec![ERROR_RECOMMENDATION]);
    }

    #[test]
    fn custom_taxonomy_drives_the_engine() {
        let policy = r#"{
            "prohibited": [
                { "category": "hype", "rules": [{ "pattern": "to\\s+the\\s+moon" }] }
            ],
            "disclosure": {
                "ai_terms": ["ai"],
                "probabilistic_terms": ["can make mistakes"],
                "professional_terms": ["consult"]
            },
            "disclaimers": [
                { "category": "ai_disclosure", "keywords": ["ai"] }
            ],
            "disclaimer_addenda": [],
            "risk_types": [],
            "suitability_terms": [],
            "referrals": []
        }"#;
        let taxonomy = Taxonomy::from_json_str(policy).unwrap();
        let engine = ComplianceEngine::with_taxonomy(taxonomy).unwrap();

        let request = ValidationRequest::new(
            "This AI summary can make mistakes; consult a professional. Stocks to the moon!",
            ContentType::GeneralInfo,
        );
        let report = engine.evaluate(&request);
        assert_eq!(report.overall_status, OverallStatus::Rejected);
        assert_eq!(report.issues_found[0].category, "hype");
    }

    #[test]
    fn tool_definition_exposes_the_agent_contract() {
        let definition = ComplianceEngine::tool_definition();
        assert_eq!(definition["name"], "compliance_checklist");
        assert_eq!(
            definition["parameters"]["required"],
            json!(["response_text", "response_type"])
        );
    }
}
