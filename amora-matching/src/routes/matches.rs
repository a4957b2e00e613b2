use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::{ApiResponse, PageParams};

use crate::services::matches::{self, MatchEntry};
use crate::AppState;

pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<MatchEntry>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let result = matches::list_matches(&mut conn, user.id, page.limit(), page.offset())?;

    Ok(Json(ApiResponse::ok(result)))
}
