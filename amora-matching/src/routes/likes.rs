use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::{ApiResponse, PageParams};

use crate::events::publisher;
use crate::models::{ProfilePicture, PublicUser};
use crate::schema::{likes, profiles, users};
use crate::services::interactions::{self, LikeOutcome, MatchedPair};
use crate::services::notify::{self, NotificationKind};
use crate::services::profiles as profile_service;
use crate::AppState;

// --- POST /likes ---

#[derive(Debug, Deserialize)]
pub struct CreateLikeRequest {
    pub liked_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub like_created: bool,
    pub is_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchedPair>,
}

pub async fn create_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLikeRequest>,
) -> AppResult<Json<ApiResponse<LikeResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let liker = profile_service::profile_by_user_id(&mut conn, user.id)?;
    let (outcome, notices) = interactions::create_like(&mut conn, liker.id, req.liked_id)?;
    drop(conn);

    match outcome {
        // Deliberately vague: the caller must not learn a block exists.
        LikeOutcome::Rejected => Err(AppError::new(
            ErrorCode::LikeRejected,
            "could not like profile",
        )),
        LikeOutcome::AlreadyLiked => Ok(Json(ApiResponse::ok_with_message(
            LikeResponse {
                like_created: false,
                is_match: false,
                matched: None,
            },
            "already liked",
        ))),
        LikeOutcome::Created { is_match, matched } => {
            let rematch = notices
                .iter()
                .any(|n| n.kind == NotificationKind::Rematch);
            notify::dispatch(&state, notices).await;

            if let Some(pair) = &matched {
                publisher::publish_match_created(
                    &state.rabbitmq,
                    pair.liker.id,
                    pair.liked.id,
                    rematch,
                )
                .await;
            }

            Ok(Json(ApiResponse::ok(LikeResponse {
                like_created: true,
                is_match,
                matched,
            })))
        }
    }
}

// --- DELETE /likes/:profile_id ---

#[derive(Debug, Deserialize)]
pub struct UnlikeParams {
    /// Also remove the reverse like when the pair was matched.
    #[serde(default)]
    pub both_ways: bool,
}

#[derive(Debug, Serialize)]
pub struct UnlikeResponse {
    pub unliked: bool,
    pub was_match: bool,
}

pub async fn delete_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(liked_id): Path<Uuid>,
    Query(params): Query<UnlikeParams>,
) -> AppResult<Json<ApiResponse<UnlikeResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let liker = profile_service::profile_by_user_id(&mut conn, user.id)?;
    let (outcome, notices) =
        interactions::delete_like(&mut conn, liker.id, liked_id, params.both_ways)?;

    let match_users: Option<(Uuid, Uuid)> = if outcome.was_match {
        let liked_user_id = profile_service::profile_by_id(&mut conn, liked_id)?.user_id;
        Some((user.id, liked_user_id))
    } else {
        None
    };
    drop(conn);

    notify::dispatch(&state, notices).await;
    if let Some((user1_id, user2_id)) = match_users {
        publisher::publish_match_ended(&state.rabbitmq, user1_id, user2_id).await;
    }

    Ok(Json(ApiResponse::ok(UnlikeResponse {
        unliked: true,
        was_match: outcome.was_match,
    })))
}

// --- GET /likes/received ---

#[derive(Debug, Serialize)]
pub struct LikerProfile {
    pub id: Uuid,
    pub user: PublicUser,
    pub fame_rating: f64,
    pub pictures: Vec<ProfilePicture>,
    pub liked_at: chrono::DateTime<chrono::Utc>,
}

pub async fn list_received_likes(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<LikerProfile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me = profile_service::profile_by_user_id(&mut conn, user.id)?;

    // Newest first.
    let liker_rows: Vec<(Uuid, chrono::DateTime<chrono::Utc>)> = likes::table
        .filter(likes::liked_id.eq(me.id))
        .select((likes::liker_id, likes::created_at))
        .order(likes::created_at.desc())
        .limit(page.limit())
        .offset(page.offset())
        .load(&mut conn)?;

    let liker_ids: Vec<Uuid> = liker_rows.iter().map(|(id, _)| *id).collect();

    let rows: Vec<(Uuid, f64, PublicUser)> = profiles::table
        .inner_join(users::table)
        .filter(profiles::id.eq_any(&liker_ids))
        .select((
            profiles::id,
            profiles::fame_rating,
            (
                users::id,
                users::username,
                users::first_name,
                users::last_name,
                users::is_online,
            ),
        ))
        .load(&mut conn)?;

    let mut pictures = profile_service::pictures_by_profile(&mut conn, &liker_ids)?;

    // Keep the like-order of the page.
    let profiles_by_id: std::collections::HashMap<Uuid, (f64, PublicUser)> = rows
        .into_iter()
        .map(|(id, fame, user)| (id, (fame, user)))
        .collect();

    let result = liker_rows
        .into_iter()
        .filter_map(|(profile_id, liked_at)| {
            profiles_by_id
                .get(&profile_id)
                .map(|(fame_rating, user)| LikerProfile {
                    id: profile_id,
                    user: user.clone(),
                    fame_rating: *fame_rating,
                    pictures: pictures.remove(&profile_id).unwrap_or_default(),
                    liked_at,
                })
        })
        .collect();

    Ok(Json(ApiResponse::ok(result)))
}
