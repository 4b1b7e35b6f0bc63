use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, Result};
use crate::traits::{NewsProvider, NewsSearchResult, TimePeriod};
use prysm_core::types::Article;

const PROVIDER: &str = "gnews";
const TIMEOUT_SECS: u64 = 30;

/// GNews.io-shaped news search client (spec §4.2).
pub struct GNewsProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GNewsProvider {
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

    async fn run_search(
        &self,
        query: &str,
        language: &str,
        country: &str,
        max: u32,
        from: Option<chrono::DateTime<Utc>>,
    ) -> Result<GNewsResponse> {
        let url = format!("{}/search", self.base_url);
        let mut req = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("lang", language),
                ("country", country),
                ("apikey", self.api_key.as_str()),
            ])
            .query(&[("max", max)]);
        if let Some(from) = from {
            req = req.query(&[("from", from.to_rfc3339())]);
        }

        debug!(query, language, country, "searching gnews");
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "gnews error");
            return Err(ProviderError::from_status(PROVIDER, status, &text));
        }
        resp.json::<GNewsResponse>()
            .await
            .map_err(|_| ProviderError::Parse(PROVIDER.to_string(), None))
    }
}

#[async_trait]
impl NewsProvider for GNewsProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(
        &self,
        query: &str,
        language: &str,
        country: &str,
        max: u32,
        time_period: Option<TimePeriod>,
        _topic_token: Option<&str>,
    ) -> Result<NewsSearchResult> {
        let now = Utc::now();
        let from = time_period.map(|tp| tp.as_from_date(now));

        let first = self.run_search(query, language, country, max, from).await;
        match first {
            Ok(resp) if resp.articles.is_empty() && from.is_some() => {
                debug!(query, "gnews bucketed search empty, retrying without bucket");
                let retry = self.run_search(query, language, country, max, None).await?;
                Ok(NewsSearchResult {
                    success: true,
                    total: retry.total_articles.unwrap_or(retry.articles.len()),
                    articles: retry.articles.into_iter().map(Into::into).collect(),
                    used_fallback: true,
                })
            }
            Ok(resp) => Ok(NewsSearchResult {
                success: true,
                total: resp.total_articles.unwrap_or(resp.articles.len()),
                articles: resp.articles.into_iter().map(Into::into).collect(),
                used_fallback: false,
            }),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(rename = "totalArticles")]
    total_articles: Option<usize>,
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
struct GNewsArticle {
    title: String,
    description: Option<String>,
    content: Option<String>,
    url: String,
    image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: chrono::DateTime<Utc>,
    source: GNewsSource,
}

#[derive(Debug, Deserialize)]
struct GNewsSource {
    name: String,
}

impl From<GNewsArticle> for Article {
    fn from(a: GNewsArticle) -> Self {
        Article {
            title: a.title,
            url: a.url,
            source_name: a.source.name,
            published_at: a.published_at,
            snippet: a.description,
            image_url: a.image,
            content: a.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_period_smallest_covering_picks_hour() {
        assert_eq!(
            TimePeriod::smallest_covering(chrono::Duration::minutes(30)),
            TimePeriod::Hour
        );
    }

    #[test]
    fn time_period_smallest_covering_picks_week_for_long_gap() {
        assert_eq!(
            TimePeriod::smallest_covering(chrono::Duration::days(5)),
            TimePeriod::Week
        );
    }

    #[test]
    fn gnews_article_maps_fields() {
        let a = GNewsArticle {
            title: "T".into(),
            description: Some("D".into()),
            content: None,
            url: "https://example.com".into(),
            image: None,
            published_at: "2026-07-28T00:00:00Z".parse().unwrap(),
            source: GNewsSource { name: "Example".into() },
        };
        let article: Article = a.into();
        assert_eq!(article.title, "T");
        assert_eq!(article.source_name, "Example");
        assert_eq!(article.snippet.as_deref(), Some("D"));
    }
}
