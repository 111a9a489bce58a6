use rocket::{Request, catch, serde::json::Json};
use shared::{ErrorCode, ErrorResponse};

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::InvalidInput, "Invalid request parameters."))
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::Unauthenticated, "Sign in to continue."))
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::NotFound, "The requested resource was not found."))
}

#[catch(409)]
pub fn conflict(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::Conflict, "The poll is busy. Please try again."))
}

#[catch(422)]
pub fn unprocessable(req: &Request) -> Json<ErrorResponse> {
    // Rocket answers 422 for JSON bodies that fail to deserialize.
    let message = match req.uri().path().as_str().ends_with("/vote") {
        true => "Vote body must look like {\"optionIndex\": 0}.",
        false => "Malformed request body.",
    };
    Json(ErrorResponse::new(ErrorCode::InvalidInput, message))
}

#[catch(429)]
pub fn too_many_requests(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::RateLimited, "Rate limit exceeded. Please wait before trying again."))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::SystemError, "An internal server error occurred."))
}
