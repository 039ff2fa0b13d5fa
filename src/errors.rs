//! # Errors
//!
//! `ApiError` is the error type returned by every view handler and extension point.
//! It renders as a sanitized JSON body with a matching status code:
//!
//! ```json
//! {"error": "todo with ID '…' not found"}
//! ```
//!
//! Database failures are logged through `tracing` and never sent to clients.
//! `DbErr::RecordNotFound` becomes a 404 and unique-constraint violations a 409,
//! so extension points can propagate Sea-ORM errors with `?`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// 404 - the resource does not exist (or is outside the viewset's queryset)
    NotFound {
        resource: String,
        id: Option<String>,
    },

    /// 400 - invalid input the framework extractors could not catch
    BadRequest { message: String },

    /// 401 - no authenticated user on the request state
    Unauthorized { message: String },

    /// 403 - authenticated but not allowed
    Forbidden { message: String },

    /// 409 - uniqueness conflict
    Conflict { message: String },

    /// 500 - database error, details logged only
    Database { internal: DbErr },

    /// 500 - anything else, details logged only
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Wrap a database error without inspecting it.
    ///
    /// Prefer `ApiError::from` (or `?`) when not-found and conflict errors
    /// should keep their own status codes.
    pub fn database(err: DbErr) -> Self {
        Self::Database { internal: err }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to clients.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::BadRequest { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Conflict { message }
            | Self::Internal { message, .. } => message.clone(),
            Self::Database { .. } => "A database error occurred".to_string(),
        }
    }

    fn log(&self) {
        match self {
            Self::Database { internal } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                message,
            } => {
                tracing::error!(user_message = %message, %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { internal } => Some(internal),
            _ => None,
        }
    }
}

/// `RecordNotFound` maps to 404, unique-constraint violations to 409 and
/// everything else to a logged 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            let resource = msg.split_whitespace().next().unwrap_or("Resource");
            return Self::not_found(resource, None);
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::conflict("Duplicate entry"),
            _ => Self::database(err),
        }
    }
}
