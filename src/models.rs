//! Core data models for the compliance gate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ================= Enums =================
//

/// Classification of a response's subject matter.
///
/// Gates which content-type-specific and risk-disclosure rules apply.
/// Unknown labels degrade to `GeneralInfo` so the engine stays total over
/// arbitrary caller input.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    InvestmentAdvice,
    GeneralInfo,
    ProductExplanation,
    MarketAnalysis,
    TaxAdvice,
    LegalAdvice,
}

// Deserialization goes through `from_label` so unrecognized labels degrade
// instead of failing the whole request.
impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(ContentType::from_label(&label))
    }
}

impl ContentType {
    /// Parse a caller-supplied label, falling back to `GeneralInfo`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "investment_advice" => ContentType::InvestmentAdvice,
            "general_info" => ContentType::GeneralInfo,
            "product_explanation" => ContentType::ProductExplanation,
            "market_analysis" => ContentType::MarketAnalysis,
            "tax_advice" => ContentType::TaxAdvice,
            "legal_advice" => ContentType::LegalAdvice,
            _ => ContentType::GeneralInfo,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::InvestmentAdvice => "investment_advice",
            ContentType::GeneralInfo => "general_info",
            ContentType::ProductExplanation => "product_explanation",
            ContentType::MarketAnalysis => "market_analysis",
            ContentType::TaxAdvice => "tax_advice",
            ContentType::LegalAdvice => "legal_advice",
        }
    }

    /// Risk disclosure is required for investment-related content only.
    pub fn requires_risk_disclosure(&self) -> bool {
        matches!(
            self,
            ContentType::InvestmentAdvice
                | ContentType::ProductExplanation
                | ContentType::MarketAnalysis
        )
    }
}

/// Severity of a detected issue. `Critical` alone can force rejection;
/// `High` alone never does.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Approved,
    RequiresModification,
    Rejected,
    Error,
}

//
// ================= Request =================
//

/// One unit of evaluation: a candidate response plus its classification.
/// Immutable once constructed; validators never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub text: String,
    pub content_type: ContentType,
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl ValidationRequest {
    pub fn new(text: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            text: text.into(),
            content_type,
            strict: true,
        }
    }

    pub fn relaxed(text: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            text: text.into(),
            content_type,
            strict: false,
        }
    }
}

//
// ================= Issue =================
//

/// One detected problem. Evidence fields (`pattern`, `matched_text`,
/// `context`) are populated by the prohibited-content check only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub description: String,
    pub requirement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        description: impl Into<String>,
        requirement: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            description: description.into(),
            requirement: requirement.into(),
            pattern: None,
            matched_text: None,
            context: None,
        }
    }

    pub fn with_evidence(
        mut self,
        pattern: impl Into<String>,
        matched_text: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        self.pattern = Some(pattern.into());
        self.matched_text = Some(matched_text.into());
        self.context = Some(context.into());
        self
    }
}

//
// ================= Check Results =================
//

/// Output of one validator: pass/fail, any issues, plus validator-specific
/// findings flattened into the serialized object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    pub passed: bool,
    pub issues: Vec<Issue>,
    #[serde(flatten)]
    pub findings: CheckFindings,
}

/// Validator-specific result fields. Untagged: each variant's field set is
/// distinct, and the empty `TypeSpecific` variant must stay last so
/// deserialization tries it only after the others.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CheckFindings {
    Disclosure {
        has_ai_mention: bool,
        has_probabilistic_warning: bool,
        has_professional_advice_warning: bool,
    },
    Prohibited {
        violations_detected: usize,
    },
    Disclaimers {
        present: Vec<String>,
        missing: Vec<String>,
        total_required: usize,
    },
    RiskDisclosure {
        disclosed_risks: Vec<String>,
        missing_risks: Vec<String>,
        disclosure_count: usize,
        minimum_required: usize,
    },
    TypeSpecific {},
}

//
// ================= Report =================
//

/// Aggregate verdict over one request. Built once per evaluation and
/// read-only afterward; serializes to the boundary contract consumed by the
/// orchestrating agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplianceReport {
    pub overall_status: OverallStatus,
    pub response_type: ContentType,
    pub strict_mode: bool,
    pub validated_at: DateTime<Utc>,
    pub checks_performed: BTreeMap<String, CheckResult>,
    pub issues_found: Vec<Issue>,
    pub missing_elements: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComplianceReport {
    /// Callers must treat anything other than `APPROVED` as "do not show
    /// verbatim".
    pub fn is_approved(&self) -> bool {
        self.overall_status == OverallStatus::Approved
    }

    pub fn has_critical_issue(&self) -> bool {
        self.issues_found
            .iter()
            .any(|issue| issue.severity == Severity::Critical)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverallStatus::Approved => "APPROVED",
            OverallStatus::RequiresModification => "REQUIRES_MODIFICATION",
            OverallStatus::Rejected => "REJECTED",
            OverallStatus::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
