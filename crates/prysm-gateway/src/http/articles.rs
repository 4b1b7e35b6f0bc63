use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use prysm_core::types::UserArticlesBundle;
use serde::Deserialize;

use crate::app::AppState;
use crate::http::{ok, ApiError, ApiResult};

const ARTICLES_COLLECTION: &str = "articles";

#[derive(Deserialize)]
pub struct UserIdRequest {
    pub user_id: String,
}

/// POST /refresh_articles_endpoint — runs the Content Fetcher in isolation
/// and persists `articles/{user_id}` (spec §4.3, §6).
pub async fn refresh_articles_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserIdRequest>,
) -> ApiResult<UserArticlesBundle> {
    let prefs = state.preferences.get(&req.user_id)?;
    let bundle = state
        .fetcher
        .refresh_user(&req.user_id, &prefs.preferences, &prefs.language, "us")
        .await?;
    Ok(ok(bundle))
}

/// POST /get_user_articles_endpoint — read-only fetch of the persisted
/// bundle; 404 when absent (spec §6).
pub async fn get_user_articles_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserIdRequest>,
) -> ApiResult<UserArticlesBundle> {
    let bundle: Option<UserArticlesBundle> = state.store.get(ARTICLES_COLLECTION, &req.user_id)?;
    let bundle = bundle.ok_or_else(|| ApiError::not_found(format!("no articles for user {}", req.user_id)))?;
    Ok(ok(bundle))
}
