use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ErrorCode, ErrorResponse, TallyError, ValidationError};
use thiserror::Error;
use tracing::error;

use crate::rate_limiter::RateLimitError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Poll not found")]
    NotFound,
    #[error("Invalid poll ID")]
    InvalidId,
    #[error("Invalid option {index}: poll has {option_count} options")]
    InvalidOption { index: usize, option_count: usize },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Your poll contains inappropriate or toxic language in the {field}. Please revise it.")]
    Moderation { field: String },
    #[error("Poll was modified concurrently; gave up after {attempts} attempts")]
    ConflictRetryExhausted { attempts: u32 },
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<TallyError> for EngineError {
    fn from(e: TallyError) -> Self {
        match e {
            TallyError::InvalidOption { index, option_count } => EngineError::InvalidOption { index, option_count },
        }
    }
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Unauthenticated => ErrorCode::Unauthenticated,
            EngineError::NotFound => ErrorCode::NotFound,
            EngineError::InvalidId
            | EngineError::InvalidOption { .. }
            | EngineError::Validation(_) => ErrorCode::InvalidInput,
            EngineError::Moderation { .. } => ErrorCode::Rejected,
            EngineError::ConflictRetryExhausted { .. } => ErrorCode::Conflict,
            EngineError::RateLimited(RateLimitError::Exceeded { .. }) => ErrorCode::RateLimited,
            EngineError::RateLimited(RateLimitError::LockFailed)
            | EngineError::Store(_) => ErrorCode::SystemError,
        }
    }

    pub fn status(&self) -> Status {
        match self.code() {
            ErrorCode::InvalidInput => Status::BadRequest,
            ErrorCode::NotFound => Status::NotFound,
            ErrorCode::Unauthenticated => Status::Unauthorized,
            ErrorCode::Conflict => Status::Conflict,
            ErrorCode::Rejected => Status::UnprocessableEntity,
            ErrorCode::RateLimited => Status::TooManyRequests,
            ErrorCode::SystemError => Status::InternalServerError,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            EngineError::Store(_) => ErrorResponse::new(self.code(), "Failed to reach the poll store. Please try again."),
            _ => ErrorResponse::new(self.code(), self.to_string()),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for EngineError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        // Clients get a generic body; the store's own message is only logged.
        if let EngineError::Store(e) = &self {
            error!(error = %e, method = %req.method(), uri = %req.uri(), "Poll store failure");
        }

        rocket::Response::build_from(Json(self.to_response()).respond_to(req)?)
            .status(self.status())
            .ok()
    }
}
