//! Application error type and HTTP mapping.
//!
//! Every fallible path in the service converges on [`AppError`], which knows how
//! to render itself as a JSON error response. Collaborator failures that must not
//! surface (geolocation, user-agent parsing) are handled before this layer and
//! never become an `AppError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload embedded in every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Application-level error taxonomy.
///
/// - `Validation` — missing or malformed input (400)
/// - `Unauthorized` — missing/invalid credentials (401)
/// - `Forbidden` — authenticated but not allowed, e.g. a guest minting a custom
///   slug or a non-owner reading analytics (403)
/// - `NotFound` — unknown slug or resource id (404, code `not_found`)
/// - `NotAccessible` — slug exists but the link is inactive or expired (404,
///   code `not_accessible`, so clients can tell "never existed" from "no longer
///   usable")
/// - `SlugInUse` — custom slug collision (409, code `slug_in_use`)
/// - `Conflict` — other unique-constraint conflicts, e.g. email already
///   registered (409)
/// - `Internal` — database or other unexpected failure (500)
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Forbidden { message: String, details: Value },
    NotFound { message: String, details: Value },
    NotAccessible { message: String, details: Value },
    SlugInUse { message: String, details: Value },
    Conflict { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn not_accessible(message: impl Into<String>, details: Value) -> Self {
        Self::NotAccessible {
            message: message.into(),
            details,
        }
    }
    pub fn slug_in_use(message: impl Into<String>, details: Value) -> Self {
        Self::SlugInUse {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn parts(self) -> (StatusCode, &'static str, String, Value) {
        match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::Unauthorized { message, details } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, details)
            }
            AppError::Forbidden { message, details } => {
                (StatusCode::FORBIDDEN, "forbidden", message, details)
            }
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::NotAccessible { message, details } => {
                (StatusCode::NOT_FOUND, "not_accessible", message, details)
            }
            AppError::SlugInUse { message, details } => {
                (StatusCode::CONFLICT, "slug_in_use", message, details)
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        }
    }

    /// Converts the error into its serializable payload without consuming it.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::Unauthorized { message, details } => ("unauthorized", message, details),
            AppError::Forbidden { message, details } => ("forbidden", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::NotAccessible { message, details } => ("not_accessible", message, details),
            AppError::SlugInUse { message, details } => ("slug_in_use", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };
        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = self.to_error_info();
        write!(f, "{}: {}", info.code, info.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("");
                if constraint.contains("slug") {
                    return AppError::slug_in_use(
                        "Slug already in use",
                        json!({ "constraint": constraint }),
                    );
                }
                return AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": constraint }),
                );
            }
        }

        tracing::error!("database error: {e}");
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Request validation failed",
            serde_json::to_value(e.field_errors()).unwrap_or_else(|_| json!({})),
        )
    }
}
