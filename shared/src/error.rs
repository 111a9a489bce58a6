use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Resource not found")]
    NotFound,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Resource conflict")]
    Conflict,
    #[error("Content rejected by moderation")]
    Rejected,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Internal system error")]
    SystemError,
}

/// JSON body returned for every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }
}
