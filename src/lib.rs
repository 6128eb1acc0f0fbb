//! Financial advisory content compliance gate
//!
//! A rule-based classifier that inspects one generated advisory response and
//! decides whether it may be shown to an end user:
//! - Applies independent checks for AI disclosure, prohibited claims,
//!   required disclaimers, risk disclosure, and content-type rules
//! - Aggregates them into one deterministic, auditable verdict
//! - Emits machine-readable remediation guidance
//! - Never crashes the caller; faults surface as ERROR reports
//!
//! PIPELINE:
//! TEXT → FIVE INDEPENDENT CHECKS → AGGREGATE → REPORT
//!
//! The orchestrating agent must run the gate once per candidate response and
//! treat any status other than APPROVED as "do not show verbatim" —
//! regenerate, append the flagged disclaimers, or fail closed.

pub mod engine;
pub mod error;
pub mod models;
pub mod taxonomy;
pub mod validators;

pub use error::{ComplianceError, Result};

// Re-export common types
pub use engine::ComplianceEngine;
pub use models::*;
pub use taxonomy::{CompiledTaxonomy, Taxonomy};
