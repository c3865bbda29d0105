use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use spookify_core::error::CoreError;
use spookify_core::listing::{ListingError, StorageFailure};
use validator::{ValidationErrors, ValidationErrorsKind};

/// Application-level error type for HTTP handlers.
///
/// Wraps domain, listing, and database errors and adds HTTP-specific
/// variants. Every variant renders as `{ "error": ..., "code": ... }`;
/// validation failures add a per-field `fields` map.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure from the track listing engine.
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body fields failed their validation rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The JSON body could not be read or deserialized.
    #[error("Invalid body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Listing(err) => classify_listing_error(err),
            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Validation(errors) => {
                let body = json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "fields": field_messages(errors),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }

            AppError::InvalidBody(rejection) => match rejection {
                JsonRejection::MissingJsonContentType(_) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_MEDIA_TYPE",
                    rejection.body_text(),
                ),
                _ => (StatusCode::BAD_REQUEST, "INVALID_BODY", rejection.body_text()),
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::NotFoundByKey { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::InvalidToken => (
            StatusCode::BAD_REQUEST,
            "INVALID_TOKEN",
            "Invalid or expired activation token".to_string(),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map a listing failure to a status and code. Storage causes are logged
/// here and never echoed to the client.
fn classify_listing_error(err: &ListingError) -> (StatusCode, &'static str, String) {
    match err {
        ListingError::InvalidPagination(msg) => {
            (StatusCode::BAD_REQUEST, "INVALID_PAGINATION", msg.clone())
        }
        ListingError::UnsafeSortKey(key) => (
            StatusCode::BAD_REQUEST,
            "UNSAFE_SORT_KEY",
            format!("invalid sort value: {key:?}"),
        ),
        ListingError::StorageFailure(StorageFailure::Timeout(deadline)) => {
            tracing::warn!(deadline_ms = deadline.as_millis() as u64, "Listing timed out");
            (
                StatusCode::GATEWAY_TIMEOUT,
                "STORAGE_TIMEOUT",
                "The catalog did not respond in time".to_string(),
            )
        }
        ListingError::StorageFailure(failure @ StorageFailure::Query(_)) => {
            tracing::error!(error = %failure, "Listing storage failure");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on a `uq_*` constraint map to 409.
/// - Foreign key violations map to 404: the referenced row is gone.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique_violation
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            // PostgreSQL foreign_key_violation
            if db_err.code().as_deref() == Some("23503") {
                tracing::debug!(error = %db_err, "Referenced row missing");
                return (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "Referenced resource not found".to_string(),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// Flatten validation errors into `field -> first message`. Nested structs
/// use dotted keys (`artist.name`).
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    collect_messages(errors, "", &mut out);
    out
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let message = list
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                out.insert(key, message);
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, &key, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, &format!("{key}[{index}]"), out);
                }
            }
        }
    }
}
