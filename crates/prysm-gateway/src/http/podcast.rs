use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use prysm_core::types::{PodcastArtifact, UserArticlesBundle};
use serde::Deserialize;

use crate::app::AppState;
use crate::http::{ok, ApiError, ApiResult};

const ARTICLES_COLLECTION: &str = "articles";

#[derive(Deserialize)]
pub struct GeneratePodcastRequest {
    pub user_id: String,
    #[serde(default = "default_presenter")]
    pub presenter_name: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
}

fn default_presenter() -> String {
    "Alex".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_voice_id() -> String {
    "alex-en-us".to_string()
}

/// POST /generate_simple_podcast_endpoint — composes a script and
/// synthesizes audio for it in one call, over the user's most recently
/// fetched article bundle (spec §4.5, §4.6, §6).
pub async fn generate_simple_podcast_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GeneratePodcastRequest>,
) -> ApiResult<PodcastArtifact> {
    let bundle: Option<UserArticlesBundle> = state.store.get(ARTICLES_COLLECTION, &req.user_id)?;
    let bundle = bundle.ok_or_else(|| ApiError::not_found(format!("no articles for user {}", req.user_id)))?;

    let artifact = state
        .script
        .compose(&bundle, &req.presenter_name, &req.language, &req.voice_id)
        .await?;
    let artifact = state.speech.synthesize(artifact).await?;

    Ok(ok(artifact))
}
