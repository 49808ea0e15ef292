use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::content::ContentError;
use crate::media::MediaError;
use crate::portfolio::EditorError;
use crate::store::StoreError;

/// Error body shared by every JSON endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Where an admin client should navigate after the error (e.g. back to the list view).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            redirect: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Not found: {what}")]
    NotFoundRedirect { what: String, redirect: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EditorError> for AppError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::NotFound(id) => AppError::NotFoundRedirect {
                what: format!("Project {}", id),
                redirect: crate::portfolio::editor::PORTFOLIO_LIST_PATH.to_string(),
            },
            EditorError::Validation(msg) => AppError::Validation(msg),
            EditorError::Store(e) => AppError::Store(e),
            EditorError::Decode(e) => AppError::Internal(format!("malformed project document: {}", e)),
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::UnknownSection(_) | ContentError::UnknownField { .. } => {
                AppError::BadRequest(err.to_string())
            }
            ContentError::Decode(e) => AppError::Validation(format!("Invalid content: {}", e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorResponse::new("Not found")),
            AppError::NotFoundRedirect { what, redirect } => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not found".to_string(),
                    message: Some(format!("{} not found", what)),
                    redirect: Some(redirect.clone()),
                },
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Authorization required"),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone())),
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new(msg.clone()),
            ),
            AppError::Store(StoreError::Unavailable(reason)) => {
                tracing::warn!(reason = %reason, "content store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("Content store not available"),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
            AppError::Media(e) => match e {
                MediaError::Empty | MediaError::NotInGallery(_) | MediaError::InvalidPath(_) => {
                    (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string()))
                }
                MediaError::TooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, ErrorResponse::new(e.to_string()))
                }
                MediaError::Io(io) => {
                    tracing::error!("Media storage error: {}", io);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorResponse {
                            error: "Upload failed".to_string(),
                            message: Some("The draft was left unchanged".to_string()),
                            redirect: None,
                        },
                    )
                }
            },
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn response_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_project_carries_redirect() {
        let err: AppError = EditorError::NotFound("abc".into()).into();
        match &err {
            AppError::NotFoundRedirect { redirect, .. } => assert_eq!(redirect, "/admin/portfolio"),
            other => panic!("unexpected variant: {:?}", other),
        }
        assert_eq!(response_status(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_unavailable_returns_503() {
        assert_eq!(
            response_status(AppError::Store(StoreError::Unavailable("offline".into()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn validation_returns_422() {
        assert_eq!(
            response_status(AppError::Validation("Project Title is required".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn unknown_content_field_is_a_bad_request() {
        let err: AppError = ContentError::UnknownField {
            section: "hero".into(),
            field: "subtitle".into(),
        }
        .into();
        assert_eq!(response_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn oversized_upload_returns_413() {
        assert_eq!(
            response_status(AppError::Media(MediaError::TooLarge { size: 10, max: 5 })),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
