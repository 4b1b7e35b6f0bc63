use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use prysm_pipeline::{StepOutcome, UpdateResult};
use serde::{Deserialize, Serialize};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct UpdateRequest {
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

#[derive(Serialize)]
pub struct StepStatus {
    pub success: bool,
    pub error: Option<String>,
}

impl From<&StepOutcome> for StepStatus {
    fn from(o: &StepOutcome) -> Self {
        Self { success: o.success, error: o.error.clone() }
    }
}

/// Fatal pipeline runs still return their per-step status map rather than a
/// bare error (spec §7: "the HTTP layer translates fatal pipeline results to
/// HTTP 500 while still including the per-step status map").
#[derive(Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub user_id: String,
    pub steps: UpdateSteps,
    pub article_count: usize,
    pub report_topic_count: usize,
    pub audio_url: Option<String>,
    pub push_sent: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct UpdateSteps {
    pub fetch: StepStatus,
    pub report: StepStatus,
    pub podcast: StepStatus,
    pub notify: StepStatus,
}

impl From<UpdateResult> for UpdateResponse {
    fn from(r: UpdateResult) -> Self {
        Self {
            success: r.succeeded(),
            user_id: r.user_id,
            steps: UpdateSteps {
                fetch: (&r.fetch).into(),
                report: (&r.report).into(),
                podcast: (&r.podcast).into(),
                notify: (&r.notify).into(),
            },
            article_count: r.article_count,
            report_topic_count: r.report_topic_count,
            audio_url: r.audio_url,
            push_sent: r.push_sent,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        let status = if self.success { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
        (status, Json(self)).into_response()
    }
}

/// POST /update_endpoint — runs the full §4.8 pipeline for one user.
pub async fn update_handler(State(state): State<Arc<AppState>>, Json(req): Json<UpdateRequest>) -> UpdateResponse {
    let result = state
        .orchestrator
        .run_update(&req.user_id, &req.presenter_name, &req.language, &req.voice_id)
        .await;
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result_with(fetch_ok: bool, report_ok: bool, podcast_ok: bool, notify_ok: bool) -> UpdateResult {
        let step = |ok: bool| {
            if ok {
                StepOutcome::ok(Duration::from_millis(1))
            } else {
                StepOutcome::failed("boom", Duration::from_millis(1))
            }
        };
        UpdateResult {
            user_id: "u1".to_string(),
            started_at: chrono::Utc::now(),
            fetch: step(fetch_ok),
            report: step(report_ok),
            podcast: step(podcast_ok),
            notify: step(notify_ok),
            article_count: 0,
            report_topic_count: 0,
            audio_url: None,
            push_sent: notify_ok,
        }
    }

    #[test]
    fn success_requires_all_fatal_steps() {
        let response: UpdateResponse = result_with(true, true, true, false).into();
        assert!(response.success);
    }

    #[test]
    fn failure_on_any_fatal_step_does_not_hide_notify_outcome() {
        let response: UpdateResponse = result_with(true, false, true, true).into();
        assert!(!response.success);
        assert!(response.steps.notify.success);
    }
}
