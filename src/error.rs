use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// MongoDB server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rendered as plain text, unlike every other variant.
    #[error("{0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(mongodb::error::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
            if write_error.code == DUPLICATE_KEY {
                warn!(error = %err, "Duplicate key");
                return AppError::Conflict("item conflicts with an existing record".to_string());
            }
        }
        AppError::Database(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "message": message }))).into_response()
            }
            AppError::Database(err) => {
                error!(error = %err, "FAIL");
                internal_server_error()
            }
            AppError::Internal(message) => {
                error!(error = %message, "FAIL");
                internal_server_error()
            }
        }
    }
}

fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": INTERNAL_SERVER_ERROR })),
    )
        .into_response()
}
