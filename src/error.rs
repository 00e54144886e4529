//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Expected business failures (unknown token, duplicate email, missing permission) carry
//! a message that is returned to the client. Unexpected failures (database, hashing,
//! signing) are logged with their cause and collapse to a fixed 500 response so no
//! internal detail leaks.
//!
//! `AppError` implements `actix_web::error::ResponseError`, and provides `From`
//! implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` so handlers can use `?`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Body returned for every 500 response.
pub const GENERIC_ERROR_MESSAGE: &str = "There was an error";

/// A single failed validation rule, reported back as `{ "field", "message" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Request failed declarative validation before reaching a handler (HTTP 400).
    ValidationError(Vec<FieldError>),
    /// A request that is well-formed but inconsistent, e.g. a task from another project (HTTP 400).
    BadRequest(String),
    /// Missing or invalid credentials, or an action the caller may not perform (HTTP 401).
    Unauthorized(String),
    /// The caller is known but the action is not allowed in the current state (HTTP 403).
    Forbidden(String),
    /// Entity missing by id, email or token (HTTP 404).
    NotFound(String),
    /// Uniqueness violation, e.g. an email already registered (HTTP 409).
    Conflict(String),
    /// Unexpected server-side error (HTTP 500). The message is logged, never returned.
    InternalServerError(String),
    /// Error originating from the database driver (HTTP 500). The message is logged, never returned.
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::ValidationError(errors) => response.json(json!({ "errors": errors })),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => response.json(json!({ "error": msg })),
            AppError::InternalServerError(cause) | AppError::DatabaseError(cause) => {
                log::error!("{}", cause);
                response.json(json!({ "error": GENERIC_ERROR_MESSAGE }))
            }
        }
    }
}

/// Unique violations become `Conflict`; everything else is a database failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        let unique_violation = error
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique_violation {
            AppError::Conflict("Record already exists".into())
        } else {
            AppError::DatabaseError(error.to_string())
        }
    }
}

/// Flattens `validator` field errors into the `{ field, message }` list, sorted by field
/// so responses are deterministic.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code));
                    FieldError::new(field, message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationError(fields)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("session token rejected: {}", error);
        AppError::Unauthorized("Invalid token".into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("bcrypt failure: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 8, message = "Password too short"))]
        password: String,
        #[validate(email(message = "Invalid e-mail"))]
        email: String,
    }

    #[test]
    fn test_error_responses() {
        let cases = [
            (AppError::ValidationError(vec![]), 400),
            (AppError::BadRequest("bad".into()), 400),
            (AppError::Unauthorized("Invalid token".into()), 401),
            (AppError::Forbidden("confirmed".into()), 403),
            (AppError::NotFound("Resource not found".into()), 404),
            (AppError::Conflict("taken".into()), 409),
            (AppError::InternalServerError("Server error".into()), 500),
            (AppError::DatabaseError("pool timed out".into()), 500),
        ];
        for (error, status) in cases {
            assert_eq!(error.error_response().status(), status, "{}", error);
        }
    }

    #[actix_rt::test]
    async fn test_internal_errors_do_not_leak_cause() {
        let response = AppError::DatabaseError("relation \"users\" does not exist".into())
            .error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let sample = Sample {
            password: "short".into(),
            email: "nope".into(),
        };
        let error: AppError = sample.validate().unwrap_err().into();
        match error {
            AppError::ValidationError(fields) => {
                assert_eq!(
                    fields,
                    vec![
                        FieldError::new("email", "Invalid e-mail"),
                        FieldError::new("password", "Password too short"),
                    ]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
