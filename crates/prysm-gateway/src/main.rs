use std::net::SocketAddr;
use std::sync::Arc;

use prysm_core::config::Config;
use prysm_discovery::DiscoveryService;
use prysm_pipeline::{Orchestrator, Providers};
use prysm_preferences::PreferenceStore;
use prysm_providers::{AnthropicChatClient, ElevenLabsTtsClient, FcmPushClient, GNewsProvider, RedditProvider};
use prysm_scheduler::{SchedulerEngine, WorkerPool};
use prysm_store::{DocStore, ObjectStore};
use tokio::sync::watch;
use tracing::{info, warn};

mod app;
mod http;

const DEV_NEWS_API_KEY: &str = "dev-gnews-key";
const DEV_LLM_API_KEY: &str = "dev-anthropic-key";
const DEV_TTS_API_KEY: &str = "dev-elevenlabs-key";
const DEV_PUSH_SERVER_KEY: &str = "dev-fcm-server-key";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prysm_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > PRYSM_CONFIG env > ~/.prysm/prysm.toml
    let config_path = std::env::var("PRYSM_CONFIG").ok();
    let config = Config::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("config load failed ({}), using defaults", e);
        Config::default()
    });

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = rusqlite::Connection::open(&config.database.path)?;
    let store = Arc::new(DocStore::new(conn)?);
    let objects = Arc::new(ObjectStore::new(
        config.object_store.root.clone(),
        config.object_store.public_base_url.clone(),
    )?);
    let preferences = Arc::new(PreferenceStore::new(Arc::clone(&store)));

    let providers = build_providers(&config);

    let orchestrator = Arc::new(Orchestrator::new(
        providers.clone(),
        Arc::clone(&store),
        Arc::clone(&objects),
        Arc::clone(&preferences),
    ));
    let discovery = Arc::new(DiscoveryService::new(providers.llm.clone(), Arc::clone(&preferences)));

    let state = Arc::new(app::AppState::new(
        config.clone(),
        store,
        objects,
        providers,
        preferences.clone(),
        Arc::clone(&orchestrator),
        discovery,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let pool = WorkerPool::spawn(Arc::clone(&orchestrator), Some(config.scheduler.worker_count));
    let scheduler_conn = rusqlite::Connection::open(&config.database.path)?;
    let scheduler = SchedulerEngine::new(scheduler_conn, preferences, pool.sender())?;
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    let router = app::build_router(state);
    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    info!("prysm gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = scheduler_task.await;

    Ok(())
}

fn build_providers(config: &Config) -> Providers {
    let p = &config.providers;

    // An unresolved key (fallbacks disabled, nothing configured) becomes an
    // empty credential rather than a silently-injected dev key — the
    // provider then fails each call with `ProviderAuth`, surfacing loudly
    // instead of masking a missing production secret.
    let news_key = p.resolve_key(&p.news_api_key, DEV_NEWS_API_KEY).unwrap_or_default();
    let llm_key = p.resolve_key(&p.llm_api_key, DEV_LLM_API_KEY).unwrap_or_default();
    let tts_key = p.resolve_key(&p.tts_api_key, DEV_TTS_API_KEY).unwrap_or_default();
    let push_key = p.resolve_key(&p.push_server_key, DEV_PUSH_SERVER_KEY).unwrap_or_default();

    Providers {
        news: Arc::new(GNewsProvider::new(news_key, p.news_base_url.clone())),
        community: Arc::new(RedditProvider::new(p.community_base_url.clone())),
        llm: Arc::new(AnthropicChatClient::new(llm_key, p.llm_base_url.clone())),
        tts: Arc::new(ElevenLabsTtsClient::new(tts_key, p.tts_base_url.clone())),
        push: Arc::new(FcmPushClient::new(push_key)),
    }
}
