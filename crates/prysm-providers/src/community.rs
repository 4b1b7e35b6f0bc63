use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, Result};
use crate::traits::CommunityProvider;
use prysm_core::types::{CommunityComment, CommunityPost};

const PROVIDER: &str = "reddit";
const TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "prysm/0.1 (news briefing bot)";

const REMOVED_SENTINELS: &[&str] = &["[removed]", "[deleted]"];

/// Reddit-shaped community/forum client (spec §4.2, "Community client").
pub struct RedditProvider {
    client: reqwest::Client,
    base_url: String,
}

impl RedditProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(TIMEOUT_SECS))
                .user_agent(USER_AGENT)
                .build()
                .expect("reqwest client"),
            base_url: base_url.into(),
        }
    }

    fn post_is_recent(created_utc: f64) -> bool {
        let created = Utc.timestamp_opt(created_utc as i64, 0).single();
        match created {
            Some(created) => Utc::now() - created <= chrono::Duration::seconds(86_400),
            None => false,
        }
    }

    fn is_removed(body: &str) -> bool {
        REMOVED_SENTINELS.contains(&body.trim())
    }
}

#[async_trait]
impl CommunityProvider for RedditProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn hot(&self, community: &str, limit: u32) -> Result<Vec<CommunityPost>> {
        let url = format!("{}/r/{}/hot.json", self.base_url, community);
        debug!(community, limit, "fetching hot posts");
        let resp = self
            .client
            .get(&url)
            .query(&[("limit", limit.max(1))])
            .send()
            .await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, community, "reddit hot error");
            return Err(ProviderError::from_status(PROVIDER, status, &text));
        }
        let listing: RedditListing<RedditPostWrapper> = resp
            .json()
            .await
            .map_err(|_| ProviderError::Parse(PROVIDER.to_string(), None))?;

        let posts = listing
            .data
            .children
            .into_iter()
            .map(|c| c.data)
            .filter(|p| Self::post_is_recent(p.created_utc))
            .map(CommunityPost::from)
            .collect();
        Ok(posts)
    }

    async fn top_comments(&self, permalink: &str, limit: u32) -> Result<Vec<CommunityComment>> {
        let url = format!("{}{}.json", self.base_url, permalink.trim_end_matches('/'));
        debug!(permalink, limit, "fetching top comments");
        let resp = self
            .client
            .get(&url)
            .query(&[("limit", limit.max(1).to_string())])
            .query(&[("sort", "top")])
            .send()
            .await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, permalink, "reddit comments error");
            return Err(ProviderError::from_status(PROVIDER, status, &text));
        }

        let sections: Vec<RedditListing<RedditCommentWrapper>> = resp
            .json()
            .await
            .map_err(|_| ProviderError::Parse(PROVIDER.to_string(), None))?;

        let comments = sections
            .into_iter()
            .nth(1)
            .map(|listing| {
                listing
                    .data
                    .children
                    .into_iter()
                    .map(|c| c.data)
                    .filter(|c| !Self::is_removed(&c.body))
                    .take(limit as usize)
                    .map(CommunityComment::from)
                    .collect()
            })
            .unwrap_or_default();
        Ok(comments)
    }
}

#[derive(Debug, Deserialize)]
struct RedditListing<T> {
    data: RedditListingData<T>,
}

#[derive(Debug, Deserialize)]
struct RedditListingData<T> {
    children: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RedditPostWrapper {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    title: String,
    score: i64,
    permalink: String,
    subreddit: String,
    created_utc: f64,
    num_comments: u32,
    author: String,
    #[serde(default)]
    selftext: String,
}

impl From<RedditPostWrapper> for CommunityPost {
    fn from(w: RedditPostWrapper) -> Self {
        w.data.into()
    }
}

impl From<RedditPost> for CommunityPost {
    fn from(p: RedditPost) -> Self {
        let created_at: DateTime<Utc> = Utc
            .timestamp_opt(p.created_utc as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);
        CommunityPost {
            title: p.title,
            score: p.score,
            permalink: p.permalink,
            community: p.subreddit,
            created_at,
            num_comments: p.num_comments,
            author: p.author,
            selftext: p.selftext,
            comments: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RedditCommentWrapper {
    data: RedditComment,
}

#[derive(Debug, Deserialize)]
struct RedditComment {
    #[serde(default)]
    body: String,
    author: String,
    score: i64,
    created_utc: f64,
    #[serde(default)]
    replies_count: Option<u32>,
    is_submitter: bool,
    #[serde(default)]
    distinguished: Option<String>,
    #[serde(default)]
    stickied: bool,
}

impl From<RedditCommentWrapper> for CommunityComment {
    fn from(w: RedditCommentWrapper) -> Self {
        w.data.into()
    }
}

impl From<RedditComment> for CommunityComment {
    fn from(c: RedditComment) -> Self {
        let created_at: DateTime<Utc> = Utc
            .timestamp_opt(c.created_utc as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);
        CommunityComment {
            body: c.body,
            author: c.author,
            score: c.score,
            created_at,
            replies_count: c.replies_count.unwrap_or(0),
            is_submitter: c.is_submitter,
            distinguished: c.distinguished,
            stickied: c.stickied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_is_recent_within_24h() {
        let now = Utc::now().timestamp() as f64;
        assert!(RedditProvider::post_is_recent(now - 3600.0));
    }

    #[test]
    fn post_is_recent_rejects_old_posts() {
        let old = (Utc::now().timestamp() - 2 * 86_400) as f64;
        assert!(!RedditProvider::post_is_recent(old));
    }

    #[test]
    fn is_removed_matches_sentinels() {
        assert!(RedditProvider::is_removed("[removed]"));
        assert!(RedditProvider::is_removed("[deleted]"));
        assert!(!RedditProvider::is_removed("a perfectly normal comment"));
    }
}
