use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::Report;
use crate::services::profiles as profile_service;
use crate::services::reports;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub reported_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
}

pub async fn create_report(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let reporter = profile_service::profile_by_user_id(&mut conn, user.id)?;
    let report = reports::create_report(
        &mut conn,
        reporter.id,
        req.reported_id,
        &req.reason,
        req.description.as_deref(),
    )?;

    Ok(Json(ApiResponse::ok(report)))
}
