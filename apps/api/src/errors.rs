use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::StoreError;
use crate::notify::{ErrorClass, Notice, RETRY_MESSAGE};
use crate::places::PlacesError;
use crate::uploads::UploadError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every response carries an error `notice` for the client to toast.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Places error: {0}")]
    Places(#[from] PlacesError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Which of the three reported classes this failure belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::NotFound(_) => ErrorClass::NotFound,
            AppError::Unauthorized => ErrorClass::Unauthorized,
            AppError::Store(e) => e.status().map_or(ErrorClass::Other, ErrorClass::from_status),
            AppError::Upload(e) => e.status().map_or(ErrorClass::Other, ErrorClass::from_status),
            AppError::Places(PlacesError::Disabled) => ErrorClass::NotFound,
            AppError::Validation(_) | AppError::Places(_) | AppError::Internal(_) => {
                ErrorClass::Other
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let class = self.class();
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                class.user_message().to_string(),
            ),
            AppError::Upload(
                e @ (UploadError::Empty
                | UploadError::TooLarge { .. }
                | UploadError::InvalidContentType(_)),
            ) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Store(_) | AppError::Upload(_) | AppError::Places(_) => {
                tracing::error!("Upstream error: {self}");
                let status = match class {
                    ErrorClass::NotFound => StatusCode::NOT_FOUND,
                    ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
                    ErrorClass::Other => StatusCode::BAD_GATEWAY,
                };
                (status, "UPSTREAM_ERROR", class.user_message().to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    RETRY_MESSAGE.to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            },
            "notice": Notice::error(message.clone()),
        });
        if let Some(redirect) = class.redirect() {
            body["redirect"] = json!(redirect);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_message_is_the_notice() {
        let (status, body) = body_of(AppError::Validation("Board is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["notice"]["level"], "error");
        assert_eq!(body["notice"]["message"], "Board is required");
        assert!(body.get("redirect").is_none());
    }

    #[tokio::test]
    async fn test_upstream_unauthorized_redirects_to_login() {
        let err = AppError::Store(StoreError::Status {
            status: 401,
            message: "jwt expired".into(),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["redirect"], "/login");
        assert_eq!(body["notice"]["message"], crate::notify::LOGIN_MESSAGE);
    }

    #[tokio::test]
    async fn test_upstream_not_found_uses_support_message() {
        let err = AppError::Store(StoreError::Status {
            status: 404,
            message: "no such collection".into(),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], crate::notify::SUPPORT_MESSAGE);
    }

    #[tokio::test]
    async fn test_other_upstream_failure_asks_to_retry() {
        let err = AppError::Store(StoreError::Status {
            status: 500,
            message: "boom".into(),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["notice"]["message"], RETRY_MESSAGE);
    }

    #[tokio::test]
    async fn test_bad_upload_content_type_is_a_client_error() {
        let err = AppError::Upload(UploadError::InvalidContentType("x y".into()));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body.get("redirect").is_none());
    }
}
