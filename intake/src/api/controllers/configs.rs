use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::SubmitConfigResponse;
use crate::api::state::ApiState;

pub const NO_CONFIG: &str = "No configuration found.";

/// `POST /api/configs`: stores the body verbatim, whatever its shape.
pub async fn submit(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<Json<SubmitConfigResponse>> {
    let config = parse_config(&body)?;

    let path = state.config_store().store(&config).await?;
    tracing::info!(path = %path.display(), size = body.len(), "stored config");

    Ok(Json(SubmitConfigResponse::success(&path)))
}

fn parse_config(body: &[u8]) -> ApiResult<Value> {
    if body.trim_ascii().is_empty() {
        return Err(ApiError::ClientInput(NO_CONFIG.to_owned()));
    }

    match serde_json::from_slice(body) {
        Ok(Value::Null) => Err(ApiError::ClientInput(NO_CONFIG.to_owned())),
        Ok(value) => Ok(value),
        Err(e) => Err(ApiError::ClientInput(format!("Invalid JSON: {e}"))),
    }
}
