use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::utils::helpers::service_name;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Bad Request: {0}")]
    BadRequestError(String),
    #[error("Validation Error: {0}")]
    ValidationError(String),
    #[error("Unauthenticated: {0}")]
    UnauthenticatedError(String),
    #[error("Forbidden: {0}")]
    ForbiddenError(String),
    #[error("Not Found: {0}")]
    NotFoundError(String),
    #[error("Conflict: {0}")]
    ConflictError(String),
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl CustomError {
    fn kind(&self) -> &'static str {
        match *self {
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
            CustomError::UnauthenticatedError(..) => "UNAUTHENTICATED_ERROR",
            CustomError::ForbiddenError(..) => "FORBIDDEN_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to hand back to the client. Infrastructure details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            CustomError::InternalServerError(detail) => {
                error!("internal error: {}", detail);
                "Internal Server Error: something went wrong".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::UnauthenticatedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.public_message(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.kind(),
            "service": service_name(),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

impl From<mongodb::error::Error> for CustomError {
    fn from(err: mongodb::error::Error) -> Self {
        CustomError::InternalServerError(format!("database error: {}", err))
    }
}

impl From<bcrypt::BcryptError> for CustomError {
    fn from(err: bcrypt::BcryptError) -> Self {
        CustomError::InternalServerError(format!("password hashing failed: {}", err))
    }
}
