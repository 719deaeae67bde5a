// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::UserSummary;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RegistrationRequest;
use crate::state::AppState;

/**
 * POST /auth/register - Create a user with professional profile and
 * additional info in one step
 *
 * Expected Input:
 * ```json
 * {
 *   "first_name": "Günel", "last_name": "Həsənova",
 *   "birth_date": "12.04.1993", "mobile_number": "701234567", "gender": "F",
 *   "password": "Passw0rd!", "password_confirm": "Passw0rd!",
 *   "profession": 1, "qualification": 2, "work_experience": 4, "areas": [3],
 *   "education": "bachelor", "education_major": "Fizika",
 *   "languages": ["azerbaijani", "english"],
 *   "profile_photo": "me.png", "instagram": "https://instagram.com/gunel",
 *   "portfolio_images": ["a.jpg"], "note": "..."
 * }
 * ```
 *
 * Expected Output (Success, 201):
 * ```json
 * { "success": true, "data": { "id": 7, "full_name": "Günel Həsənova", "mobile_number": "701234567" } }
 * ```
 *
 * Any failure answers 400 with every offending field in `field_errors`,
 * and nothing is persisted.
 */
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> ApiResult<UserSummary> {
    if !state.config.api.enable_registration {
        return Err(ApiError::forbidden("Registration is disabled"));
    }

    let request = json_body(payload)?;
    let user = state.registration.register(request).await?;
    Ok(ApiResponse::created(user.summary()))
}
