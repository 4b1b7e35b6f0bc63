use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use prysm_discovery::DiscoveryTurn;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::http::{ok, ApiError, ApiResult};

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectsAction {
    Analyze,
    Get,
}

#[derive(Deserialize)]
pub struct UpdateSubjectsRequest {
    pub user_id: String,
    pub action: SubjectsAction,
    #[serde(default)]
    pub conversation_history: Vec<(String, String)>,
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Serialize)]
pub struct SubjectsResult {
    pub specific_subjects: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_message: Option<String>,
}

/// POST /update_specific_subjects — `action: "get"` returns the current set
/// unmodified, `action: "analyze"` runs one discovery turn (which extracts
/// and unions any newly named entities inline) and returns the result
/// (spec §4.10, §6).
pub async fn update_specific_subjects_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSubjectsRequest>,
) -> ApiResult<SubjectsResult> {
    match req.action {
        SubjectsAction::Get => {
            let prefs = state.preferences.get(&req.user_id)?;
            Ok(ok(SubjectsResult {
                specific_subjects: prefs.specific_subjects,
                ai_message: None,
            }))
        }
        SubjectsAction::Analyze => {
            let user_message = req
                .user_message
                .ok_or_else(|| ApiError::bad_request("user_message is required for action=analyze"))?;
            let prefs = state.preferences.get(&req.user_id)?;

            let response = state
                .discovery
                .answer(DiscoveryTurn {
                    user_id: &req.user_id,
                    user_preferences: &prefs,
                    conversation_history: &req.conversation_history,
                    user_message: &user_message,
                    language: &req.language,
                })
                .await?;

            let updated = state.preferences.get(&req.user_id)?;
            Ok(ok(SubjectsResult {
                specific_subjects: updated.specific_subjects,
                ai_message: Some(response.ai_message),
            }))
        }
    }
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub user_preferences: prysm_core::types::UserPreferences,
    #[serde(default)]
    pub conversation_history: Vec<(String, String)>,
    pub user_message: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Serialize)]
pub struct AnswerResult {
    pub ai_message: String,
    pub conversation_ending: bool,
    pub ready_for_news: bool,
    pub usage: Usage,
}

#[derive(Serialize)]
pub struct Usage {
    pub tokens_in: u32,
    pub tokens_out: u32,
}

/// POST /answer — the primary conversational turn (spec §4.10, §6).
pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnswerRequest>,
) -> ApiResult<AnswerResult> {
    let user_id = req.user_id.as_deref().unwrap_or(&req.user_preferences.user_id);

    let response = state
        .discovery
        .answer(DiscoveryTurn {
            user_id,
            user_preferences: &req.user_preferences,
            conversation_history: &req.conversation_history,
            user_message: &req.user_message,
            language: &req.language,
        })
        .await?;

    Ok(ok(AnswerResult {
        ai_message: response.ai_message,
        conversation_ending: response.conversation_ending,
        ready_for_news: response.ready_for_news,
        usage: Usage {
            tokens_in: response.tokens_in,
            tokens_out: response.tokens_out,
        },
    }))
}
