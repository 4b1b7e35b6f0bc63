use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, Result};
use crate::traits::{ChatCompletion, ChatUsage, LlmProvider};

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";
const TIMEOUT_SECS: u64 = 60;

/// Anthropic-shaped single-call chat client (spec §4.2, "LLM chat client").
/// Grounded on `skynet_agent::anthropic::AnthropicProvider::send`, trimmed to
/// the non-streaming, non-tool-use, non-thinking subset the pipeline needs.
pub struct AnthropicChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicChatClient {
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
impl LlmProvider for AnthropicChatClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[(String, String)],
        max_tokens: u32,
        temperature: f32,
        model: &str,
    ) -> Result<ChatCompletion> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "max_tokens": max_tokens,
            "temperature": temperature,
            "system": system,
            "messages": messages
                .iter()
                .map(|(role, content)| serde_json::json!({"role": role, "content": content}))
                .collect::<Vec<_>>(),
        });

        debug!(model, max_tokens, "sending request to anthropic");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "anthropic api error");
            return Err(ProviderError::from_status(PROVIDER, status, &text));
        }

        let parsed: ApiResponse = resp
            .json()
            .await
            .map_err(|_| ProviderError::Parse(PROVIDER.to_string(), None))?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Unknown => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(ChatCompletion {
            text,
            usage: ChatUsage {
                tokens_in: parsed.usage.input_tokens,
                tokens_out: parsed.usage.output_tokens,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}
