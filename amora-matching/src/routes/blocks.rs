use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::{ApiResponse, PageParams};

use crate::models::{ProfilePicture, PublicUser};
use crate::schema::{blocks, profiles, users};
use crate::services::interactions::{self, BlockOutcome};
use crate::services::notify;
use crate::services::profiles as profile_service;
use crate::AppState;

// --- POST /blocks ---

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub blocked_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub blocked: bool,
}

pub async fn create_block(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBlockRequest>,
) -> AppResult<Json<ApiResponse<BlockResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let blocker = profile_service::profile_by_user_id(&mut conn, user.id)?;
    let (outcome, notices) = interactions::create_block(&mut conn, blocker.id, req.blocked_id)?;
    drop(conn);

    // Unlike/unmatch fallout of the block, if any. The block itself is silent.
    notify::dispatch(&state, notices).await;

    let response = BlockResponse { blocked: true };
    match outcome {
        BlockOutcome::Blocked => Ok(Json(ApiResponse::ok(response))),
        BlockOutcome::AlreadyBlocked => Ok(Json(ApiResponse::ok_with_message(
            response,
            "already blocked",
        ))),
    }
}

// --- DELETE /blocks/:profile_id ---

#[derive(Debug, Serialize)]
pub struct UnblockResponse {
    pub unblocked: bool,
}

pub async fn delete_block(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(blocked_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UnblockResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let blocker = profile_service::profile_by_user_id(&mut conn, user.id)?;
    interactions::delete_block(&mut conn, blocker.id, blocked_id)?;

    Ok(Json(ApiResponse::ok(UnblockResponse { unblocked: true })))
}

// --- GET /blocks ---

#[derive(Debug, Serialize)]
pub struct BlockedProfile {
    pub id: Uuid,
    pub user: PublicUser,
    pub pictures: Vec<ProfilePicture>,
    pub blocked_at: chrono::DateTime<chrono::Utc>,
}

pub async fn list_blocks(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<BlockedProfile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me = profile_service::profile_by_user_id(&mut conn, user.id)?;

    let block_rows: Vec<(Uuid, chrono::DateTime<chrono::Utc>)> = blocks::table
        .filter(blocks::blocker_id.eq(me.id))
        .select((blocks::blocked_id, blocks::created_at))
        .order(blocks::created_at.desc())
        .limit(page.limit())
        .offset(page.offset())
        .load(&mut conn)?;

    let blocked_ids: Vec<Uuid> = block_rows.iter().map(|(id, _)| *id).collect();

    let rows: Vec<(Uuid, PublicUser)> = profiles::table
        .inner_join(users::table)
        .filter(profiles::id.eq_any(&blocked_ids))
        .select((
            profiles::id,
            (
                users::id,
                users::username,
                users::first_name,
                users::last_name,
                users::is_online,
            ),
        ))
        .load(&mut conn)?;

    let mut pictures = profile_service::pictures_by_profile(&mut conn, &blocked_ids)?;

    let users_by_id: std::collections::HashMap<Uuid, PublicUser> = rows.into_iter().collect();

    let result = block_rows
        .into_iter()
        .filter_map(|(profile_id, blocked_at)| {
            users_by_id.get(&profile_id).map(|user| BlockedProfile {
                id: profile_id,
                user: user.clone(),
                pictures: pictures.remove(&profile_id).unwrap_or_default(),
                blocked_at,
            })
        })
        .collect();

    Ok(Json(ApiResponse::ok(result)))
}
