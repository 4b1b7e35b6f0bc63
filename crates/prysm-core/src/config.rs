use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Scheduler tick cadence — cron-equivalent `*/15 * * * *` (spec §6).
pub const SCHEDULER_TICK_SECS: u64 = 15 * 60;
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_VOICE_ID: &str = "alex-en-us";

/// Top-level config (prysm.toml + PRYSM_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            object_store: ObjectStoreConfig::default(),
            providers: ProvidersConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// Where `put_object` writes files on disk (stand-in for an S3-like bucket).
    #[serde(default = "default_object_store_root")]
    pub root: String,
    /// Public base URL prefixed onto stored object keys.
    #[serde(default = "default_object_store_base_url")]
    pub public_base_url: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            root: default_object_store_root(),
            public_base_url: default_object_store_base_url(),
        }
    }
}

/// Provider credentials. `allow_dev_fallback_keys` gates the hardcoded dev
/// fallbacks required by spec §6 ("MUST allow the fallbacks to be disabled
/// for production").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "bool_true")]
    pub allow_dev_fallback_keys: bool,
    pub news_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    pub tts_api_key: Option<String>,
    #[serde(default = "default_tts_base_url")]
    pub tts_base_url: String,
    pub push_server_key: Option<String>,
    #[serde(default = "default_news_base_url")]
    pub news_base_url: String,
    #[serde(default = "default_community_base_url")]
    pub community_base_url: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            allow_dev_fallback_keys: true,
            news_api_key: None,
            llm_api_key: None,
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            tts_api_key: None,
            tts_base_url: default_tts_base_url(),
            push_server_key: None,
            news_base_url: default_news_base_url(),
            community_base_url: default_community_base_url(),
        }
    }
}

impl ProvidersConfig {
    /// Resolve a configured key, falling back to a fixed dev key only when
    /// `allow_dev_fallback_keys` permits it. Returns `None` when neither is
    /// available, so callers can surface `ProviderAuth` rather than send an
    /// empty credential upstream.
    pub fn resolve_key(&self, configured: &Option<String>, dev_fallback: &str) -> Option<String> {
        if let Some(k) = configured {
            return Some(k.clone());
        }
        if self.allow_dev_fallback_keys {
            Some(dev_fallback.to_string())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,
    #[serde(default = "default_presenter_name")]
    pub default_presenter_name: String,
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
            default_presenter_name: default_presenter_name(),
            default_language: default_language(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.prysm/prysm.db", home)
}
fn default_object_store_root() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.prysm/objects", home)
}
fn default_object_store_base_url() -> String {
    "http://localhost:8787/objects".to_string()
}
fn default_llm_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_llm_model() -> String {
    "claude-sonnet-4-6".to_string()
}
fn default_tts_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}
fn default_news_base_url() -> String {
    "https://gnews.io/api/v4".to_string()
}
fn default_community_base_url() -> String {
    "https://oauth.reddit.com".to_string()
}
fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}
fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}
fn default_presenter_name() -> String {
    "Alex".to_string()
}
fn default_language() -> String {
    "en".to_string()
}

impl Config {
    /// Load config from a TOML file with PRYSM_* env var overrides.
    ///
    /// Checks in order: explicit path argument, PRYSM_CONFIG env var,
    /// ~/.prysm/prysm.toml.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: Config = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PRYSM_").split("_"))
            .extract()
            .map_err(|e| crate::error::PrysmError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.prysm/prysm.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_allows_dev_fallback() {
        let cfg = Config::default();
        assert!(cfg.providers.allow_dev_fallback_keys);
    }

    #[test]
    fn resolve_key_prefers_configured() {
        let mut providers = ProvidersConfig::default();
        providers.news_api_key = Some("configured".to_string());
        assert_eq!(
            providers.resolve_key(&providers.news_api_key.clone(), "dev-fallback"),
            Some("configured".to_string())
        );
    }

    #[test]
    fn resolve_key_falls_back_when_allowed() {
        let providers = ProvidersConfig::default();
        assert_eq!(
            providers.resolve_key(&None, "dev-fallback"),
            Some("dev-fallback".to_string())
        );
    }

    #[test]
    fn resolve_key_none_when_fallback_disabled() {
        let mut providers = ProvidersConfig::default();
        providers.allow_dev_fallback_keys = false;
        assert_eq!(providers.resolve_key(&None, "dev-fallback"), None);
    }
}
