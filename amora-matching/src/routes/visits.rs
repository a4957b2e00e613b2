use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::{ApiResponse, PageParams};

use crate::services::notify;
use crate::services::profiles as profile_service;
use crate::services::visits::{self, VisitOutcome, VisitorProfile};
use crate::AppState;

// --- POST /visits/:profile_id ---

#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub recorded: bool,
}

pub async fn record_visit(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(visited_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VisitResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let visitor = profile_service::profile_by_user_id(&mut conn, user.id)?;
    let (outcome, notices) = visits::record_visit(&mut conn, visitor.id, visited_id)?;
    drop(conn);

    notify::dispatch(&state, notices).await;

    Ok(Json(ApiResponse::ok(VisitResponse {
        recorded: outcome == VisitOutcome::Recorded,
    })))
}

// --- GET /visits ---

pub async fn list_received_visits(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<VisitorProfile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me = profile_service::profile_by_user_id(&mut conn, user.id)?;
    let result = visits::list_received_visits(&mut conn, me.id, page.limit(), page.offset())?;

    Ok(Json(ApiResponse::ok(result)))
}
