use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use prysm_core::types::{DetailLevel, PreferencesTree, UserPreferences};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::http::{ok, ApiError, ApiResult};

#[derive(Deserialize)]
pub struct SavePreferencesRequest {
    pub user_id: String,
    pub preferences: PreferencesTree,
    #[serde(default)]
    pub detail_level: DetailLevel,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Serialize)]
pub struct SavePreferencesResult {
    pub format_version: String,
    pub topics_count: usize,
    pub subtopics_count: usize,
}

/// POST /save_initial_preferences — 400 on schema violation, 200 on a
/// persisted v3.0 document (spec §6).
pub async fn save_initial_preferences_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SavePreferencesRequest>,
) -> ApiResult<SavePreferencesResult> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::bad_request("user_id must not be empty"));
    }

    let saved = state
        .preferences
        .save_with(&req.user_id, req.preferences, req.detail_level, &req.language)?;

    Ok(ok(SavePreferencesResult {
        format_version: saved.format_version,
        topics_count: saved.topics_count(),
        subtopics_count: saved.subtopics_count(),
    }))
}

#[derive(Deserialize)]
pub struct UserIdRequest {
    pub user_id: String,
}

/// POST /get_user_preferences — returns the v3.0 document, or an empty
/// skeleton when the user has never saved preferences.
pub async fn get_user_preferences_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserIdRequest>,
) -> ApiResult<UserPreferences> {
    let prefs = state.preferences.get(&req.user_id)?;
    Ok(ok(prefs))
}
