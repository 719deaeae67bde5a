use axum::extract::{Extension, State};

use crate::database::models::UserProfile;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::load_user_profile;
use crate::state::AppState;

/// GET /api/auth/whoami - the authenticated user with profile and
/// additional info (both `null` for accounts created outside registration)
pub async fn whoami_get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<UserProfile> {
    let profile = load_user_profile(state.store.as_ref(), user).await?;
    Ok(ApiResponse::success(profile))
}
