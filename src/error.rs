// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Every fatal failure of the grading pipeline surfaces as one of these.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error (storage failures, broken configuration)
    InternalServerError(String),

    // 400 Bad Request (request shape validation)
    BadRequest(String),

    // 400 Bad Request (missing or impossible timings, bad level)
    InvalidAttempt(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found (authenticated person id has no enrollment)
    UnenrolledPerson(i64),

    // 404 Not Found (student id is not enrolled)
    UnknownStudent(i64),

    // 404 Not Found (score factor or other reference data)
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UnenrolledPerson(id) => write!(f, "Person {} is not an enrolled student", id),
            AppError::UnknownStudent(id) => write!(f, "Unknown student: {}", id),
            other => write!(f, "{:?}", other),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidAttempt(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid attempt: {}", msg))
            }
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::UnenrolledPerson(id) => (
                StatusCode::NOT_FOUND,
                format!("Person {} is not an enrolled student", id),
            ),
            AppError::UnknownStudent(id) => (
                StatusCode::NOT_FOUND,
                format!("No enrolled student with id {}", id),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
