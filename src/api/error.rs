use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::sync::SyncError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing x-user-id header")]
    MissingUser,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUser => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Sync(e) => match e {
                SyncError::Unauthenticated(_) | SyncError::TokenRefreshRequired(_) => {
                    StatusCode::UNAUTHORIZED
                }
                SyncError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
                SyncError::NotFound(_) => StatusCode::NOT_FOUND,
                SyncError::Conflict(_) => StatusCode::CONFLICT,
                SyncError::UpstreamFetch { .. } | SyncError::RemoteStore { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                SyncError::Storage(_) | SyncError::Cancelled { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = Json(json!({
            "error": true,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
