use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vrtour_core::error::CoreError;
use vrtour_core::validation::{
    FieldErrors, MSG_CROSS_TOUR, MSG_SCENE_LINKED, MSG_SELF_LOOP, MSG_UNIQUE_ORDER,
    NON_FIELD_ERRORS,
};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `vrtour_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Core(core) => core_response(core),

            AppError::Database(err) => match classify_sqlx_error(&err) {
                Some(core) => core_response(core),
                None => {
                    tracing::error!(error = %err, "Database error");
                    internal_response()
                }
            },

            AppError::BadRequest(msg) => {
                error_body(StatusCode::BAD_REQUEST, "BAD_REQUEST", &msg, None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_response()
            }
        }
    }
}

fn core_response(core: CoreError) -> Response {
    match core {
        CoreError::NotFound { entity, .. } => error_body(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            &format!("{entity} not found"),
            None,
        ),
        CoreError::Validation(fields) => error_body(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Validation failed",
            Some(&fields),
        ),
        CoreError::Integrity(fields) => error_body(
            StatusCode::BAD_REQUEST,
            "INTEGRITY_ERROR",
            "Integrity error",
            Some(&fields),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal_response()
        }
    }
}

fn internal_response() -> Response {
    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred",
        None,
    )
}

fn error_body(
    status: StatusCode,
    code: &str,
    message: &str,
    fields: Option<&FieldErrors>,
) -> Response {
    let body = match fields {
        Some(fields) => json!({ "error": message, "code": code, "fields": fields }),
        None => json!({ "error": message, "code": code }),
    };
    (status, axum::Json(body)).into_response()
}

/// Classify a sqlx error surfaced by a write into a domain error.
///
/// - Unique violations (`23505`) and foreign-key violations (`23503`) map
///   to [`CoreError::Integrity`].
/// - Check violations (`23514`) map to [`CoreError::Validation`]; the
///   hotspot rules keep their own messages, any other check is reported on
///   the column it guards.
/// - Anything else is unclassified and returns `None`.
pub fn classify_sqlx_error(err: &sqlx::Error) -> Option<CoreError> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    let constraint = db_err.constraint().unwrap_or_default();

    match db_err.code().as_deref() {
        Some("23505") => {
            let message = match constraint {
                "uq_scenes_tour_sort_order" => MSG_UNIQUE_ORDER.to_string(),
                other => format!("Duplicate value violates unique constraint: {other}"),
            };
            Some(CoreError::integrity(NON_FIELD_ERRORS, message))
        }
        Some("23503") => {
            let field = match constraint {
                "fk_scenes_tour" => "tour",
                "fk_hotspots_source_scene" => "source_scene",
                "fk_hotspots_target_scene" => "target_scene",
                _ => NON_FIELD_ERRORS,
            };
            Some(CoreError::integrity(field, "Referenced object does not exist."))
        }
        Some("23514") => Some(match constraint {
            "ck_hotspots_same_tour" => CoreError::validation(NON_FIELD_ERRORS, MSG_CROSS_TOUR),
            "ck_hotspots_not_self_loop" => CoreError::validation(NON_FIELD_ERRORS, MSG_SELF_LOOP),
            "ck_scenes_hotspots_same_tour" => CoreError::validation("tour", MSG_SCENE_LINKED),
            other => CoreError::validation(check_field(other), "Value is out of range."),
        }),
        _ => None,
    }
}

/// API field guarded by a `ck_<table>_<column>` constraint.
fn check_field(constraint: &str) -> &str {
    let column = ["ck_tours_", "ck_scenes_", "ck_hotspots_"]
        .iter()
        .find_map(|prefix| constraint.strip_prefix(prefix));
    match column {
        Some("sort_order") => "order",
        Some(column) => column,
        None => NON_FIELD_ERRORS,
    }
}
