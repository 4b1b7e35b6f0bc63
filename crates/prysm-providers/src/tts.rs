use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ProviderError, Result};
use crate::traits::TtsProvider;

const PROVIDER: &str = "elevenlabs";
const TIMEOUT_SECS: u64 = 120;

/// ElevenLabs-shaped text-to-speech client (spec §4.2, "TTS client"). Single
/// call, caller decides chunking — no client-side retries or streaming.
pub struct ElevenLabsTtsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsTtsClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(TIMEOUT_SECS))
                .build()
                .expect("reqwest client"),
            api_key,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TtsProvider for ElevenLabsTtsClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
        format: &str,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);
        debug!(voice_id, model_id, chars = text.len(), "requesting tts audio");

        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .query(&[("output_format", format)])
            .json(&serde_json::json!({
                "text": text,
                "model_id": model_id,
            }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "tts error");
            return Err(ProviderError::from_status(PROVIDER, status, &text));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
