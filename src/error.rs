use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

use crate::booking::ValidationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read bookings: {0}")]
    StorageRead(#[source] DbErr),

    #[error("failed to save booking: {0}")]
    StorageWrite(#[source] DbErr),

    #[error("unreadable booking request: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Validation messages are shown to the user verbatim.
            AppError::Validation(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
            }
            AppError::StorageRead(err) => {
                tracing::error!(error = %err, "Error fetching bookings");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "An error occurred while fetching data." })),
                )
                    .into_response()
            }
            AppError::StorageWrite(err) => {
                tracing::error!(error = %err, "Error saving booking");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while saving data",
                )
                    .into_response()
            }
            // Extraction errors name internal types, so only a fixed text goes out.
            AppError::MalformedBody(detail) => {
                tracing::debug!(%detail, "Rejected unreadable booking request");
                (StatusCode::BAD_REQUEST, "Invalid booking request").into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_unprocessable() {
        let response = AppError::from(ValidationError::MissingSlot).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_storage_faults_are_internal() {
        let read = AppError::StorageRead(DbErr::Custom("boom".into())).into_response();
        assert_eq!(read.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let write = AppError::StorageWrite(DbErr::Custom("boom".into())).into_response();
        assert_eq!(write.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let response =
            AppError::MalformedBody("invalid type: integer `5`".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
