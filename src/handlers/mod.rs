// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth, /auth/* and /reference/*) → Protected (bearer JWT, /api/*)

pub mod protected;
pub mod public;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;

/// Unwrap a JSON body, reporting malformed input as `INVALID_JSON`
/// instead of axum's plain-text rejection.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::invalid_json(rejection.body_text()))
        }
    }
}
