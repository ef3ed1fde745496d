//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It implements `actix_web::error::ResponseError` so handlers
//! can return `Result<_, AppError>` and have failures translated into the
//! right HTTP status and JSON body.
//!
//! Two rules shape the mapping:
//! - credential failures are undifferentiated: unknown email and wrong
//!   password both surface as the same `AuthFailure` message, so the API
//!   cannot be used to enumerate registered addresses;
//! - storage failures are surfaced as a generic 400 and the detail only goes
//!   to the server log, never to the client.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// `WWW-Authenticate` challenge attached to every 401 response.
pub const BEARER_CHALLENGE: (&str, &str) = ("WWW-Authenticate", "Bearer");

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or semantically invalid request (HTTP 400).
    BadRequest(String),
    /// Failed input validation from the `validator` crate (HTTP 422).
    Validation(String),
    /// Bad credentials on login (HTTP 401). Deliberately carries no detail
    /// about which of the two checks failed.
    AuthFailure,
    /// Missing, malformed or expired bearer token (HTTP 401).
    Unauthorized(String),
    /// Valid identity, but not allowed: inactive account or a resource owned
    /// by someone else (HTTP 403).
    Forbidden(String),
    /// Duplicate unique identifier on create (HTTP 400).
    Conflict(String),
    /// Requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Constraint violation or transaction error. Surfaced to the client as a
    /// generic 400; the wrapped detail is logged server-side only.
    Storage(String),
    /// Unexpected server-side fault, e.g. a hashing failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::AuthFailure => write!(f, "Incorrect username or password"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::Validation(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
            AppError::AuthFailure => HttpResponse::Unauthorized()
                .insert_header(BEARER_CHALLENGE)
                .json(json!({
                    "error": "Incorrect username or password"
                })),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized()
                .insert_header(BEARER_CHALLENGE)
                .json(json!({
                    "error": msg
                })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            AppError::Conflict(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::Storage(msg) => {
                log::error!("storage failure: {}", msg);
                HttpResponse::BadRequest().json(json!({
                    "error": "Something went wrong."
                }))
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error."
                }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            // A unique-constraint race that slipped past a pre-check is still
            // a duplicate, not a generic storage fault.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Record already exists.".into())
            }
            _ => AppError::Storage(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Hashing or verification faults are server-side problems, never a signal
/// about the credentials themselves.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
