use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct ProviderStatus {
    pub name: &'static str,
    pub status: &'static str,
}

/// GET /health_check — base shape `{status, timestamp}` plus ADDED
/// operational detail (process version, worker pool size, best-effort
/// provider reachability). Grounded on
/// `skynet-gateway::http::health::health_handler`.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<Utc>,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub worker_count: usize,
    pub requests_served: u64,
    pub providers: Vec<ProviderStatus>,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let providers = state.config.providers.clone();
    let status = |configured: bool| if configured { "configured" } else { "dev_fallback" };

    let provider_list = vec![
        ProviderStatus {
            name: "news",
            status: status(providers.news_api_key.is_some()),
        },
        ProviderStatus {
            name: "llm",
            status: status(providers.llm_api_key.is_some()),
        },
        ProviderStatus {
            name: "tts",
            status: status(providers.tts_api_key.is_some()),
        },
        ProviderStatus {
            name: "push",
            status: status(providers.push_server_key.is_some()),
        },
    ];

    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        worker_count: state.config.scheduler.worker_count,
        requests_served: state.note_request() + 1,
        providers: provider_list,
    })
}
