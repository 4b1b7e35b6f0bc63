use thiserror::Error;

/// Classification of an external-provider failure (spec §7). Every client
/// maps non-2xx responses and transport failures into one of these instead
/// of bubbling raw `reqwest::Error`s, mirroring
/// `skynet_agent::provider::ProviderError`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider {provider} request timed out after {timeout_secs}s")]
    Timeout { provider: &'static str, timeout_secs: u64 },

    #[error("provider {provider} daily quota exhausted")]
    Quota { provider: &'static str },

    #[error("provider {provider} rate limited, retry after {retry_after_ms}ms")]
    RateLimit {
        provider: &'static str,
        retry_after_ms: u64,
    },

    #[error("provider {provider} rejected credentials: {message}")]
    Auth { provider: &'static str, message: String },

    #[error("provider {provider} transient error ({status}): {message}")]
    Transient {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("provider {provider} permanent error ({status}): {message}")]
    Permanent {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("failed to parse {provider} response: {0}")]
    Parse(String, #[source] Option<serde_json::Error>),

    #[error("push token rejected: {0}")]
    PushUnknownToken(String),

    #[error("push sender unauthorized: {0}")]
    PushUnauthorized(String),
}

impl ProviderError {
    /// `true` when the fetcher should degrade gracefully (empty results)
    /// rather than abort the current step (spec §7).
    pub fn is_quota(&self) -> bool {
        matches!(self, ProviderError::Quota { .. })
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimit { .. })
    }

    /// Classify an HTTP status + body into a `ProviderError` for `provider`,
    /// following `AnthropicProvider::send`'s branch-on-429-then-fall-through
    /// shape.
    pub fn from_status(provider: &'static str, status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();
        if status == 429 || lower.contains("rate limit") {
            return ProviderError::RateLimit {
                provider,
                retry_after_ms: 5_000,
            };
        }
        if status == 401 || status == 403 {
            return ProviderError::Auth {
                provider,
                message: body.to_string(),
            };
        }
        if status == 402 || lower.contains("quota") || lower.contains("daily limit") {
            return ProviderError::Quota { provider };
        }
        if status >= 500 {
            return ProviderError::Transient {
                provider,
                status,
                message: body.to_string(),
            };
        }
        ProviderError::Permanent {
            provider,
            status,
            message: body.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
