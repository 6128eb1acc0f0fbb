//! Pattern taxonomy: the compliance policy as data
//!
//! Regex rule sets for prohibited claims and keyword sets for disclosures,
//! disclaimers, risk types, and content-type rules. The policy ships as an
//! embedded JSON document and is compiled once at startup into immutable
//! match-ready structures, so rules can change without touching validator
//! logic.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{ComplianceError, Result};
use crate::models::ContentType;

const DEFAULT_POLICY: &str = include_str!("policy/default.json");

lazy_static! {
    /// Compiled built-in policy, shared process-wide. The embedded document
    /// is covered by tests; failing to compile it is a build defect, not a
    /// runtime condition.
    pub(crate) static ref DEFAULT_TAXONOMY: Arc<CompiledTaxonomy> = Arc::new(
        Taxonomy::builtin()
            .and_then(Taxonomy::compile)
            .expect("embedded default policy is valid"),
    );
}

//
// ================= Policy Document =================
//

/// The declarative policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    pub prohibited: Vec<ProhibitedCategory>,
    pub disclosure: DisclosureTerms,
    pub disclaimers: Vec<DisclaimerCategory>,
    pub disclaimer_addenda: Vec<DisclaimerAddendum>,
    pub risk_types: Vec<String>,
    pub suitability_terms: Vec<String>,
    pub referrals: Vec<ReferralRule>,
}

/// One prohibited-content category and its pattern rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProhibitedCategory {
    pub category: String,
    pub rules: Vec<PatternRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: String,
    /// Qualifier-exception list: a match is suppressed when the text
    /// immediately after it begins with one of these words.
    #[serde(default)]
    pub not_followed_by: Vec<String>,
}

/// Term lists backing the AI-disclosure check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclosureTerms {
    pub ai_terms: Vec<String>,
    pub probabilistic_terms: Vec<String>,
    pub professional_terms: Vec<String>,
}

/// One required-disclaimer category with its acceptable keyword variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclaimerCategory {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Content-type-gated disclaimer requirement layered on the general set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclaimerAddendum {
    pub content_type: ContentType,
    /// Name reported in `missing_elements` when the addendum is unmet.
    pub element: String,
    pub keywords: Vec<String>,
}

/// Professional-referral phrases required for a content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRule {
    pub content_type: ContentType,
    pub keywords: Vec<String>,
}

impl Taxonomy {
    /// The built-in policy, embedded at compile time.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(DEFAULT_POLICY)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Compile into the immutable match-ready form. Prohibited patterns are
    /// compiled case-insensitive; every keyword list is lowercased once so
    /// validators only lowercase the input text.
    pub fn compile(self) -> Result<CompiledTaxonomy> {
        let mut prohibited = Vec::with_capacity(self.prohibited.len());
        for category in self.prohibited {
            let mut rules = Vec::with_capacity(category.rules.len());
            for rule in category.rules {
                let regex = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ComplianceError::InvalidPattern {
                        category: category.category.clone(),
                        pattern: rule.pattern.clone(),
                        source: Box::new(source),
                    })?;
                rules.push(CompiledRule {
                    source: rule.pattern,
                    regex,
                    not_followed_by: lowercase_all(rule.not_followed_by),
                });
            }
            prohibited.push(CompiledCategory {
                category: category.category,
                rules,
            });
        }

        Ok(CompiledTaxonomy {
            prohibited,
            disclosure: DisclosureTerms {
                ai_terms: lowercase_all(self.disclosure.ai_terms),
                probabilistic_terms: lowercase_all(self.disclosure.probabilistic_terms),
                professional_terms: lowercase_all(self.disclosure.professional_terms),
            },
            disclaimers: self
                .disclaimers
                .into_iter()
                .map(|d| DisclaimerCategory {
                    category: d.category,
                    keywords: lowercase_all(d.keywords),
                })
                .collect(),
            disclaimer_addenda: self
                .disclaimer_addenda
                .into_iter()
                .map(|a| DisclaimerAddendum {
                    content_type: a.content_type,
                    element: a.element,
                    keywords: lowercase_all(a.keywords),
                })
                .collect(),
            risk_types: lowercase_all(self.risk_types),
            suitability_terms: lowercase_all(self.suitability_terms),
            referrals: self
                .referrals
                .into_iter()
                .map(|r| ReferralRule {
                    content_type: r.content_type,
                    keywords: lowercase_all(r.keywords),
                })
                .collect(),
        })
    }
}

fn lowercase_all(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.to_lowercase()).collect()
}

//
// ================= Compiled Form =================
//

/// Immutable, match-ready policy. Built once, never rewritten; safe to share
/// across threads.
#[derive(Debug)]
pub struct CompiledTaxonomy {
    pub(crate) prohibited: Vec<CompiledCategory>,
    pub(crate) disclosure: DisclosureTerms,
    pub(crate) disclaimers: Vec<DisclaimerCategory>,
    pub(crate) disclaimer_addenda: Vec<DisclaimerAddendum>,
    pub(crate) risk_types: Vec<String>,
    pub(crate) suitability_terms: Vec<String>,
    pub(crate) referrals: Vec<ReferralRule>,
}

#[derive(Debug)]
pub(crate) struct CompiledCategory {
    pub(crate) category: String,
    pub(crate) rules: Vec<CompiledRule>,
}

#[derive(Debug)]
pub(crate) struct CompiledRule {
    /// Original pattern source, reported as issue evidence.
    pub(crate) source: String,
    pub(crate) regex: Regex,
    pub(crate) not_followed_by: Vec<String>,
}

impl CompiledTaxonomy {
    pub(crate) fn addenda_for(
        &self,
        content_type: ContentType,
    ) -> impl Iterator<Item = &DisclaimerAddendum> {
        self.disclaimer_addenda
            .iter()
            .filter(move |a| a.content_type == content_type)
    }

    pub(crate) fn referral_for(&self, content_type: ContentType) -> Option<&ReferralRule> {
        self.referrals
            .iter()
            .find(|r| r.content_type == content_type)
    }
}
