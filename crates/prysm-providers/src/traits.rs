use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use prysm_core::types::Article;

/// Coarse recency bucket for news search (spec §4.2). Quantized up to the
/// smallest bucket that still covers a requested `from_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Hour,
    Day,
    Week,
}

impl TimePeriod {
    pub fn smallest_covering(age: chrono::Duration) -> Self {
        if age <= chrono::Duration::hours(1) {
            TimePeriod::Hour
        } else if age <= chrono::Duration::days(1) {
            TimePeriod::Day
        } else {
            TimePeriod::Week
        }
    }

    pub fn as_from_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimePeriod::Hour => now - chrono::Duration::hours(1),
            TimePeriod::Day => now - chrono::Duration::days(1),
            TimePeriod::Week => now - chrono::Duration::weeks(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewsSearchResult {
    pub success: bool,
    pub total: usize,
    pub articles: Vec<Article>,
    pub used_fallback: bool,
}

/// News-search collaborator (spec §4.2, "News search client").
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(
        &self,
        query: &str,
        language: &str,
        country: &str,
        max: u32,
        time_period: Option<TimePeriod>,
        topic_token: Option<&str>,
    ) -> Result<NewsSearchResult>;
}

/// Reddit-shaped community/forum collaborator.
#[async_trait]
pub trait CommunityProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn hot(
        &self,
        community: &str,
        limit: u32,
    ) -> Result<Vec<prysm_core::types::CommunityPost>>;

    async fn top_comments(
        &self,
        permalink: &str,
        limit: u32,
    ) -> Result<Vec<prysm_core::types::CommunityComment>>;
}

pub struct ChatUsage {
    pub tokens_in: u32,
    pub tokens_out: u32,
}

pub struct ChatCompletion {
    pub text: String,
    pub usage: ChatUsage,
}

/// Single-shot LLM chat collaborator (spec §4.2, "LLM chat client"). No
/// streaming — the pipeline only ever needs one complete response per call.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(
        &self,
        system: &str,
        messages: &[(String, String)],
        max_tokens: u32,
        temperature: f32,
        model: &str,
    ) -> Result<ChatCompletion>;
}

/// Text-to-speech collaborator.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
        format: &str,
    ) -> Result<Vec<u8>>;
}

pub struct PushOutcome {
    pub message_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlatformOpts {
    pub high_priority: bool,
    pub default_sound: bool,
    pub badge: Option<u32>,
}

/// Mobile push collaborator (FCM-shaped).
#[async_trait]
pub trait PushProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        platform_opts: &PlatformOpts,
    ) -> Result<PushOutcome>;
}
