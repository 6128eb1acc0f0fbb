//! Error types for the compliance gate

use thiserror::Error;

/// Result type alias for compliance gate operations
pub type Result<T> = std::result::Result<T, ComplianceError>;

#[derive(Error, Debug)]
pub enum ComplianceError {

    // =============================
    // Policy Loading Errors
    // =============================

    #[error("Invalid pattern '{pattern}' in category '{category}': {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
