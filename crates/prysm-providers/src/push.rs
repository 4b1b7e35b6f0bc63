use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, Result};
use crate::traits::{PlatformOpts, PushOutcome, PushProvider};

const PROVIDER: &str = "fcm";
const TIMEOUT_SECS: u64 = 10;

/// Firebase Cloud Messaging-shaped push client (spec §4.2, "Push client").
/// Uses the legacy `fcm/send` HTTP endpoint with a server key, the simplest
/// shape that keeps `ProvidersConfig.push_server_key` as a single bearer
/// credential instead of a full service-account JSON.
pub struct FcmPushClient {
    client: reqwest::Client,
    server_key: String,
    base_url: String,
}

impl FcmPushClient {
    pub fn new(server_key: String) -> Self {
        Self::with_base_url(server_key, "https://fcm.googleapis.com")
    }

    pub fn with_base_url(server_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(TIMEOUT_SECS))
                .build()
                .expect("reqwest client"),
            server_key,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PushProvider for FcmPushClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        platform_opts: &PlatformOpts,
    ) -> Result<PushOutcome> {
        let url = format!("{}/fcm/send", self.base_url);
        debug!(device_token = &device_token[..device_token.len().min(12)], "sending push");

        let payload = serde_json::json!({
            "to": device_token,
            "priority": if platform_opts.high_priority { "high" } else { "normal" },
            "notification": {
                "title": title,
                "body": body,
                "sound": if platform_opts.default_sound { "default" } else { serde_json::Value::Null },
                "badge": platform_opts.badge,
            },
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("key={}", self.server_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();

        if status == 401 {
            warn!(status, "fcm unauthorized");
            return Err(ProviderError::PushUnauthorized(text));
        }

        let parsed: FcmResponse = serde_json::from_str(&text)
            .map_err(|_| ProviderError::Parse(PROVIDER.to_string(), None))?;

        if parsed.failure > 0 {
            if let Some(result) = parsed.results.first() {
                if let Some(ref error) = result.error {
                    if error == "NotRegistered" || error == "InvalidRegistration" {
                        return Err(ProviderError::PushUnknownToken(error.clone()));
                    }
                    if error == "MismatchSenderId" {
                        return Err(ProviderError::PushUnauthorized(error.clone()));
                    }
                    return Err(ProviderError::from_status(PROVIDER, status, error));
                }
            }
        }

        let message_id = parsed
            .results
            .first()
            .and_then(|r| r.message_id.clone())
            .unwrap_or_else(|| parsed.multicast_id.to_string());

        Ok(PushOutcome { message_id })
    }
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    multicast_id: i64,
    #[serde(default)]
    failure: u32,
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    #[serde(default, rename = "message_id")]
    message_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
