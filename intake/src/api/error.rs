use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::models::ErrorResponse;
use crate::storage::StoreError;

pub type ApiResult<T, E = ApiError> = Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself is unusable. Nothing was written.
    #[error("{0}")]
    ClientInput(String),
    #[error(transparent)]
    ServerIo(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) => StatusCode::BAD_REQUEST,
            Self::ServerIo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::ClientInput(reason) => tracing::debug!(%reason, "rejected request"),
            Self::ServerIo(e) => tracing::error!("server error: {e:?}"),
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
