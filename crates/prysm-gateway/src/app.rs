use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use prysm_core::config::Config;
use prysm_discovery::DiscoveryService;
use prysm_pipeline::{ContentFetcher, Orchestrator, Providers, ReportBuilder, ScriptComposer, SpeechSynthesizer};
use prysm_preferences::PreferenceStore;
use prysm_store::{DocStore, ObjectStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http;

/// Shared application state, composed once at startup (spec §9:
/// "process-wide singletons... re-architected as explicit
/// dependency-injected collaborators"). Grounded on
/// `skynet-gateway::app::AppState`.
pub struct AppState {
    pub config: Config,
    pub store: Arc<DocStore>,
    pub objects: Arc<ObjectStore>,
    pub providers: Providers,
    pub preferences: Arc<PreferenceStore>,
    /// Single-stage collaborators, for the per-operation endpoints
    /// (`refresh_articles_endpoint`, `get_complete_report_endpoint`,
    /// `generate_simple_podcast_endpoint`) that run one §4 stage in
    /// isolation rather than the full §4.8 pipeline.
    pub fetcher: ContentFetcher,
    pub reports: ReportBuilder,
    pub script: ScriptComposer,
    pub speech: SpeechSynthesizer,
    pub orchestrator: Arc<Orchestrator>,
    pub discovery: Arc<DiscoveryService>,
    pub started_at: Instant,
    pub requests_served: AtomicU64,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<DocStore>,
        objects: Arc<ObjectStore>,
        providers: Providers,
        preferences: Arc<PreferenceStore>,
        orchestrator: Arc<Orchestrator>,
        discovery: Arc<DiscoveryService>,
    ) -> Self {
        Self {
            fetcher: ContentFetcher::new(providers.clone(), Arc::clone(&store)),
            reports: ReportBuilder::new(providers.clone(), Arc::clone(&store)),
            script: ScriptComposer::new(providers.clone(), Arc::clone(&store), Arc::clone(&objects)),
            speech: SpeechSynthesizer::new(providers.clone(), Arc::clone(&store), Arc::clone(&objects)),
            config,
            store,
            objects,
            providers,
            preferences,
            orchestrator,
            discovery,
            started_at: Instant::now(),
            requests_served: AtomicU64::new(0),
        }
    }

    pub fn note_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed)
    }
}

/// Wires the §6 HTTP surface: one endpoint per core operation, JSON over
/// POST with CORS preflight support. Grounded on
/// `skynet-gateway::app::build_router`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health_check", get(http::health::health_handler))
        .route("/health", get(http::health::health_handler))
        .route(
            "/save_initial_preferences",
            post(http::preferences::save_initial_preferences_handler),
        )
        .route(
            "/get_user_preferences",
            post(http::preferences::get_user_preferences_handler),
        )
        .route(
            "/update_specific_subjects",
            post(http::discovery::update_specific_subjects_handler),
        )
        .route("/answer", post(http::discovery::answer_handler))
        .route(
            "/refresh_articles_endpoint",
            post(http::articles::refresh_articles_handler),
        )
        .route(
            "/get_user_articles_endpoint",
            post(http::articles::get_user_articles_handler),
        )
        .route(
            "/get_complete_report_endpoint",
            post(http::reports::get_complete_report_handler),
        )
        .route(
            "/get_aifeed_reports_endpoint",
            post(http::reports::get_aifeed_reports_handler),
        )
        .route(
            "/generate_simple_podcast_endpoint",
            post(http::podcast::generate_simple_podcast_handler),
        )
        .route("/update_endpoint", post(http::update::update_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
