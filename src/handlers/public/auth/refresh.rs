// handlers/public/auth/refresh.rs - POST /auth/token/refresh handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{FieldError, FieldErrors};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// POST /auth/token/refresh - exchange `{ "refresh": "<token>" }` for
/// `{ "access": "<token>" }`. The account must still exist and be active.
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<RefreshResponse> {
    let request = json_body(payload)?;
    let refresh = request
        .refresh
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::validation(FieldErrors::single("refresh", FieldError::required())))?;

    let access = state.login.refresh(refresh.trim()).await?;
    Ok(ApiResponse::success(RefreshResponse { access }))
}
