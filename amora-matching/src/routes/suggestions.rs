use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::{ApiResponse, PageParams};

use crate::services::suggestions::{self, SuggestedProfile, SuggestionFilters};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_fame: Option<f64>,
    pub max_fame: Option<f64>,
    pub max_distance: Option<f64>,
    /// Comma-separated tag names; every tag must be present.
    pub tags: Option<String>,
}

impl SuggestionParams {
    fn page(&self) -> PageParams {
        let mut page = PageParams::default();
        if let Some(limit) = self.limit {
            page.limit = limit;
        }
        if let Some(offset) = self.offset {
            page.offset = offset;
        }
        page
    }

    fn filters(&self) -> SuggestionFilters {
        SuggestionFilters {
            min_age: self.min_age,
            max_age: self.max_age,
            min_fame: self.min_fame,
            max_fame: self.max_fame,
            max_distance: self.max_distance,
            tags: self
                .tags
                .as_deref()
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

pub async fn get_suggestions(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> AppResult<Json<ApiResponse<Vec<SuggestedProfile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let page = params.page();
    let result = suggestions::suggest(
        &mut conn,
        user.id,
        page.limit(),
        page.offset(),
        &params.filters(),
    )?;

    Ok(Json(ApiResponse::ok(result)))
}
