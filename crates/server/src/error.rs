//! Typed errors for the recommendation operations.

use serde_json::{Value, json};
use thiserror::Error;

/// Everything a recommendation request (or startup) can fail with.
///
/// Callers match on the variant to tell a missing title from a bad request
/// from a broken deployment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("Title not found: {title}")]
    TitleNotFound { title: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model artifact {artifact} unavailable: {reason}")]
    ModelUnavailable { artifact: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecommendError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            RecommendError::TitleNotFound { .. } => "not_found",
            RecommendError::InvalidRequest(_) => "invalid_request",
            RecommendError::ModelUnavailable { .. } => "model_unavailable",
            RecommendError::Internal(_) => "internal",
        }
    }

    /// Structured payload for a request-routing layer
    pub fn payload(&self) -> Value {
        json!({
            "error": self.kind(),
            "message": self.to_string(),
        })
    }
}

pub type RecommendResult<T> = Result<T, RecommendError>;
