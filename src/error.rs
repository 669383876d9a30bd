use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Week not found: {0}")]
    WeekNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Remote API error: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("Stale curriculum: {0}")]
    StaleCurriculum(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// Auth-class failures are never retried and never fall back to a
    /// local-only mutation.
    pub fn is_auth(&self) -> bool {
        match self {
            AppError::Auth(_) => true,
            AppError::Remote { status: Some(401), .. } => true,
            AppError::Remote { message, .. } => {
                let message = message.to_ascii_lowercase();
                message.contains("unauthorized")
                    || message.contains("invalid token")
                    || message.contains("token expired")
            }
            _ => false,
        }
    }

    /// The remote store reports a missing week as a plain message, not a
    /// dedicated status; the coordinator keys its refetch path off this.
    pub fn is_week_not_found(&self) -> bool {
        match self {
            AppError::WeekNotFound(_) => true,
            AppError::Remote { message, .. } => {
                let message = message.to_ascii_lowercase();
                message.contains("week not found")
                    || (message.contains("week") && message.contains("not found"))
            }
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::CourseNotFound(id) => (StatusCode::NOT_FOUND, format!("Course not found: {}", id)),
            AppError::WeekNotFound(id) => (StatusCode::NOT_FOUND, format!("Week not found: {}", id)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Remote { status, message } => {
                error!("remote API error (status {:?}): {}", status, message);
                (StatusCode::BAD_GATEWAY, message)
            }
            AppError::StaleCurriculum(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
