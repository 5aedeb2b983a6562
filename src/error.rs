//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every component returns a typed outcome; this is the single place where those outcomes
//! are mapped to HTTP status codes and JSON bodies.
//!
//! Two renderings exist because the public contract differs per route family: task routes
//! answer with `{"error": ...}`, auth and admin routes with `{"message": ...}`. `AppError`
//! produces the former, [`MessageError`] wraps an `AppError` to produce the latter.
//!
//! Internal errors carry a detail string that is logged but never sent to the caller.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Generic body returned for every internal failure.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input the caller can correct (HTTP 400).
    InvalidInput(String),
    /// Duplicate username on registration (HTTP 400).
    Conflict(String),
    /// Missing, malformed, forged or expired credentials (HTTP 401).
    Unauthenticated(String),
    /// Authenticated, but the identity lacks the administrator capability (HTTP 403).
    Forbidden(String),
    /// Missing resource, or a resource owned by someone else (HTTP 404).
    NotFound(String),
    /// Storage, hashing or signing failure (HTTP 500).
    /// The payload is diagnostic detail for the log only.
    Internal(String),
}

impl AppError {
    /// Message that is safe to show to the caller.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::InvalidInput(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg,
            AppError::Internal(_) => INTERNAL_MESSAGE,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn render(&self, key: &str) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            log::error!("Request failed with internal error: {}", detail);
        }
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), json!(self.public_message()));
        HttpResponse::build(self.status()).json(body)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `{"error": ...}` responses.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        self.render("error")
    }
}

/// An `AppError` rendered as `{"message": ...}`, used by the auth and admin routes.
#[derive(Debug)]
pub struct MessageError(pub AppError);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for MessageError {
    fn status_code(&self) -> StatusCode {
        self.0.status()
    }

    fn error_response(&self) -> HttpResponse {
        self.0.render("message")
    }
}

impl From<AppError> for MessageError {
    fn from(error: AppError) -> MessageError {
        MessageError(error)
    }
}

/// Validation failures are caller-correctable input errors. The first field
/// message is surfaced when the rule carries one; rejected values are never echoed.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let fields = errors.field_errors();
        let message = fields
            .values()
            .flat_map(|field| field.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .or_else(|| {
                let mut names: Vec<&str> = fields.keys().copied().collect();
                names.sort_unstable();
                names.first().map(|name| format!("Invalid value for {}", name))
            })
            .unwrap_or_else(|| "Invalid input".to_string());
        AppError::InvalidInput(message)
    }
}

/// Storage failures degrade to `Internal`. Callers that give a unique violation a
/// domain meaning (registration) match on it before converting.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::Internal(format!("Blocking task failed: {}", error))
    }
}
