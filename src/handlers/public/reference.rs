// handlers/public/reference.rs - GET /reference/:kind handler

use axum::extract::{Path, State};

use crate::database::models::{Reference, ReferenceKind};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /reference/:kind - list `fields`, `qualifications` or `regions`,
/// ordered by name.
pub async fn reference_list(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Vec<Reference>> {
    let kind = ReferenceKind::from_plural(&kind)
        .ok_or_else(|| ApiError::not_found(format!("Unknown reference list '{}'", kind)))?;
    let rows = state.references.list(kind).await?;
    Ok(ApiResponse::success(rows))
}
