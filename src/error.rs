use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the calculation core: loading a policy file or
/// reading a form field that cannot be interpreted.
///
/// The core itself reports its outcomes through
/// [`PaymentPlanResult`](crate::PaymentPlanResult) and never fails.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid policy: {field}: {reason}")]
    InvalidPolicy { field: String, reason: String },

    #[error("Failed to read '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid field: {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Result type for the policy and form layers.
pub type PlanResult<T> = Result<T, PlanError>;
