use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;
use tracing::error;

use crate::password::HashError;
use crate::response::ApiResponse;

/// Failures crossing the service boundary. Validation problems are
/// user-correctable and travel as messages in the response envelope;
/// everything else is infrastructure and surfaces as a generic 500.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),
    #[error("password hashing unavailable")]
    Hashing(#[source] HashError),
    #[error("database failure")]
    Database(#[source] sqlx::Error),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServiceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::failure(errors)),
            )
                .into_response(),
            ServiceError::Hashing(e) => {
                error!(error = %e, "password hashing failed");
                internal()
            }
            ServiceError::Database(e) => {
                error!(error = %e, "database failure");
                internal()
            }
        }
    }
}

// Infrastructure detail stays in the logs; the client gets a fixed message.
fn internal() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::failure(vec![
            "internal server error".to_string(),
        ])),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let resp =
            ServiceError::Validation(vec!["Email already exists.".to_string()]).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_failure_maps_to_internal_error() {
        let resp = ServiceError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
