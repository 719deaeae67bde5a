// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::auth::TokenPair;
use crate::database::models::UserSummary;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginRequest;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: UserSummary,
    pub tokens: TokenPair,
}

/**
 * POST /auth/login - Authenticate by mobile number and receive a token pair
 *
 * Expected Input:
 * ```json
 * { "mobile_number": "501234567", "password": "Passw0rd!" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "message": "Login successful.",
 *     "user": { "id": 1, "full_name": "Kamran Məmmədov", "mobile_number": "501234567" },
 *     "tokens": { "refresh": "eyJhbGciOiJIUzI1NiI...", "access": "eyJhbGciOiJIUzI1NiI..." }
 *   }
 * }
 * ```
 *
 * Wrong password and unknown number both answer 400 with
 * `non_field_errors: [{ "code": "INVALID_CREDENTIALS", ... }]`.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let request = json_body(payload)?;
    let outcome = state.login.login(request).await?;

    Ok(ApiResponse::success(LoginResponse {
        message: "Login successful.",
        user: outcome.user.summary(),
        tokens: outcome.tokens,
    }))
}
