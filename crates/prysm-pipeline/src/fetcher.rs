use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use prysm_core::types::{
    BundleSummary, PreferencesTree, SubtopicArtifact, SubtopicPrefs, TopicArtifact,
    UserArticlesBundle,
};
use prysm_providers::{ProviderError, TimePeriod};
use prysm_store::DocStore;
use tracing::{debug, warn};

use crate::error::Result;
use crate::providers::Providers;

const SUBTOPIC_SPACING: Duration = Duration::from_secs(2);
const TOPIC_SPACING: Duration = Duration::from_secs(2);
const QUERY_SPACING: Duration = Duration::from_secs(1);
const TOP_N_PER_CALL: u32 = 2;
const TOP_N_HEADLINES: usize = 6;
const ARTICLES_COLLECTION: &str = "articles";

/// Content Fetcher (spec §4.3): composes news-search and community-forum
/// calls under per-call quota and rate-limit constraints, strictly
/// sequential and spaced to respect the news provider's small daily quota.
pub struct ContentFetcher {
    providers: Providers,
    store: Arc<DocStore>,
}

impl ContentFetcher {
    pub fn new(providers: Providers, store: Arc<DocStore>) -> Self {
        Self { providers, store }
    }

    /// One (topic, subtopic) pair. Returns the artifact plus whether a
    /// quota/rate-limit wall was hit (spec §4.3 step 1-2).
    pub async fn fetch_subtopic(
        &self,
        subtopic_name: &str,
        prefs: &SubtopicPrefs,
        language: &str,
        country: &str,
        with_comments: bool,
    ) -> (SubtopicArtifact, bool) {
        let mut artifact = SubtopicArtifact {
            subtopic_name: subtopic_name.to_string(),
            ..Default::default()
        };
        let mut quota_exceeded = false;

        match self
            .providers
            .news
            .search(
                subtopic_name,
                language,
                country,
                TOP_N_PER_CALL,
                Some(TimePeriod::Day),
                None,
            )
            .await
        {
            Ok(result) => artifact.articles_for_subtopic_name = result.articles,
            Err(ProviderError::Quota { .. }) => {
                debug!(subtopic_name, "news quota exhausted on subtopic headline search");
                quota_exceeded = true;
            }
            Err(e) => warn!(subtopic_name, error = %e, "subtopic headline search failed"),
        }

        for query in &prefs.queries {
            if quota_exceeded {
                artifact.queries.insert(query.clone(), Vec::new());
                continue;
            }
            tokio::time::sleep(QUERY_SPACING).await;
            match self
                .providers
                .news
                .search(query, language, country, TOP_N_PER_CALL, Some(TimePeriod::Day), None)
                .await
            {
                Ok(result) => {
                    artifact.queries.insert(query.clone(), result.articles);
                }
                Err(ProviderError::Quota { .. }) | Err(ProviderError::RateLimit { .. }) => {
                    debug!(subtopic_name, query, "quota/rate-limit hit, aborting remaining queries");
                    quota_exceeded = true;
                    artifact.queries.insert(query.clone(), Vec::new());
                }
                Err(e) => {
                    warn!(subtopic_name, query, error = %e, "query search failed");
                    artifact.queries.insert(query.clone(), Vec::new());
                }
            }
        }

        for community in &prefs.subreddits {
            let posts = match self.providers.community.hot(community, TOP_N_PER_CALL).await {
                Ok(posts) => posts,
                Err(e) => {
                    warn!(community, error = %e, "community hot fetch failed");
                    Vec::new()
                }
            };
            let now = Utc::now();
            let mut kept: Vec<_> = posts
                .into_iter()
                .filter(|p| now - p.created_at <= chrono::Duration::seconds(86_400))
                .take(TOP_N_PER_CALL as usize)
                .collect();

            if with_comments {
                for post in &mut kept {
                    match self.providers.community.top_comments(&post.permalink, 5).await {
                        Ok(comments) => post.comments = Some(comments),
                        Err(e) => warn!(permalink = %post.permalink, error = %e, "comment fetch failed"),
                    }
                }
            }
            artifact.communities.insert(community.clone(), kept);
        }

        (artifact, quota_exceeded)
    }

    /// One topic across all of its subtopics, sequentially spaced.
    pub async fn fetch_topic(
        &self,
        topic_name: &str,
        subtopics: &std::collections::BTreeMap<String, SubtopicPrefs>,
        language: &str,
        country: &str,
    ) -> TopicArtifact {
        let mut artifact = TopicArtifact {
            topic_name: topic_name.to_string(),
            ..Default::default()
        };

        let mut any_quota = false;
        for (idx, (name, prefs)) in subtopics.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(SUBTOPIC_SPACING).await;
            }
            let (sub, quota_hit) = self.fetch_subtopic(name, prefs, language, country, false).await;
            any_quota |= quota_hit;
            artifact.subtopics.insert(name.clone(), sub);
        }
        artifact.warnings.quota_exceeded = any_quota;

        let mut headlines: Vec<_> = artifact
            .subtopics
            .values()
            .flat_map(|s| s.articles_for_subtopic_name.clone())
            .collect();
        headlines.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        headlines.truncate(TOP_N_HEADLINES);
        artifact.topic_headlines = headlines;

        artifact.recompute_summary();
        artifact
    }

    /// Full per-user refresh: iterate all topics sequentially, persist a
    /// `UserArticlesBundle` keyed by `user_id`, overwriting any prior bundle.
    pub async fn refresh_user(
        &self,
        user_id: &str,
        preferences: &PreferencesTree,
        language: &str,
        country: &str,
    ) -> Result<UserArticlesBundle> {
        let mut topics_data = std::collections::BTreeMap::new();
        for (idx, (topic_name, subtopics)) in preferences.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(TOPIC_SPACING).await;
            }
            let artifact = self.fetch_topic(topic_name, subtopics, language, country).await;
            topics_data.insert(topic_name.clone(), artifact);
        }

        let mut bundle = UserArticlesBundle {
            user_id: user_id.to_string(),
            refresh_timestamp: Utc::now(),
            topics_data,
            summary: BundleSummary::default(),
        };
        bundle.recompute_summary(language, country);

        self.store.set(ARTICLES_COLLECTION, user_id, &bundle)?;
        debug!(
            user_id,
            topics = bundle.summary.topics_processed,
            articles = bundle.summary.total_articles,
            "articles bundle refreshed"
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prysm_core::types::{Article, CommunityComment, CommunityPost};
    use prysm_providers::{CommunityProvider, LlmProvider, NewsProvider, NewsSearchResult, PushProvider, TtsProvider};
    use rusqlite::Connection;

    struct StubNews {
        quota_after: Option<usize>,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl NewsProvider for StubNews {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn search(
            &self,
            query: &str,
            _language: &str,
            _country: &str,
            _max: u32,
            _time_period: Option<TimePeriod>,
            _topic_token: Option<&str>,
        ) -> prysm_providers::Result<NewsSearchResult> {
            let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if let Some(q) = self.quota_after {
                if n >= q {
                    return Err(ProviderError::Quota { provider: "stub" });
                }
            }
            Ok(NewsSearchResult {
                success: true,
                total: 1,
                articles: vec![Article {
                    title: format!("article for {query}"),
                    url: "https://example.com".to_string(),
                    source_name: "Example".to_string(),
                    published_at: Utc::now(),
                    snippet: None,
                    image_url: None,
                    content: None,
                }],
                used_fallback: false,
            })
        }
    }

    struct StubCommunity;

    #[async_trait]
    impl CommunityProvider for StubCommunity {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn hot(&self, _community: &str, _limit: u32) -> prysm_providers::Result<Vec<CommunityPost>> {
            Ok(vec![CommunityPost {
                title: "hot post".to_string(),
                score: 10,
                permalink: "/r/test/1".to_string(),
                community: "test".to_string(),
                created_at: Utc::now(),
                num_comments: 2,
                author: "someone".to_string(),
                selftext: String::new(),
                comments: None,
            }])
        }

        async fn top_comments(&self, _permalink: &str, _limit: u32) -> prysm_providers::Result<Vec<CommunityComment>> {
            Ok(Vec::new())
        }
    }

    struct StubLlm;
    #[async_trait]
    impl LlmProvider for StubLlm {
        fn name(&self) -> &'static str {
            "stub"
        }
        async fn complete(
            &self,
            _system: &str,
            _messages: &[(String, String)],
            _max_tokens: u32,
            _temperature: f32,
            _model: &str,
        ) -> prysm_providers::Result<prysm_providers::ChatCompletion> {
            Ok(prysm_providers::ChatCompletion {
                text: "stub".to_string(),
                usage: prysm_providers::ChatUsage { tokens_in: 1, tokens_out: 1 },
            })
        }
    }

    struct StubTts;
    #[async_trait]
    impl TtsProvider for StubTts {
        fn name(&self) -> &'static str {
            "stub"
        }
        async fn synthesize(&self, _text: &str, _voice_id: &str, _model_id: &str, _format: &str) -> prysm_providers::Result<Vec<u8>> {
            Ok(vec![])
        }
    }

    struct StubPush;
    #[async_trait]
    impl PushProvider for StubPush {
        fn name(&self) -> &'static str {
            "stub"
        }
        async fn send(
            &self,
            _device_token: &str,
            _title: &str,
            _body: &str,
            _platform_opts: &prysm_providers::PlatformOpts,
        ) -> prysm_providers::Result<prysm_providers::PushOutcome> {
            Ok(prysm_providers::PushOutcome { message_id: "1".to_string() })
        }
    }

    fn fetcher(quota_after: Option<usize>) -> ContentFetcher {
        let providers = Providers {
            news: Arc::new(StubNews { quota_after, calls: Default::default() }),
            community: Arc::new(StubCommunity),
            llm: Arc::new(StubLlm),
            tts: Arc::new(StubTts),
            push: Arc::new(StubPush),
        };
        let store = Arc::new(DocStore::new(Connection::open_in_memory().unwrap()).unwrap());
        ContentFetcher::new(providers, store)
    }

    #[tokio::test]
    async fn fetch_subtopic_collects_articles_and_posts() {
        let fetcher = fetcher(None);
        let prefs = SubtopicPrefs {
            subreddits: vec!["technology".to_string()],
            queries: vec!["ai".to_string()],
        };
        let (artifact, quota_hit) = fetcher.fetch_subtopic("ai", &prefs, "en", "us", false).await;
        assert!(!quota_hit);
        assert_eq!(artifact.articles_for_subtopic_name.len(), 1);
        assert_eq!(artifact.queries["ai"].len(), 1);
        assert_eq!(artifact.communities["technology"].len(), 1);
    }

    #[tokio::test]
    async fn fetch_subtopic_stops_remaining_queries_on_quota() {
        let fetcher = fetcher(Some(0));
        let prefs = SubtopicPrefs {
            subreddits: vec![],
            queries: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };
        let (artifact, quota_hit) = fetcher.fetch_subtopic("topic", &prefs, "en", "us", false).await;
        assert!(quota_hit);
        assert!(artifact.articles_for_subtopic_name.is_empty());
        assert!(artifact.queries["a"].is_empty());
        assert!(artifact.queries["b"].is_empty());
        assert!(artifact.queries["c"].is_empty());
    }

    #[tokio::test]
    async fn fetch_topic_computes_summary_invariant() {
        let fetcher = fetcher(None);
        let mut subtopics = std::collections::BTreeMap::new();
        subtopics.insert(
            "ai".to_string(),
            SubtopicPrefs { subreddits: vec!["technology".to_string()], queries: vec!["ai".to_string()] },
        );
        let artifact = fetcher.fetch_topic("technology", &subtopics, "en", "us").await;
        let expected_articles = artifact.topic_headlines.len()
            + artifact.subtopics.values().map(|s| s.article_count()).sum::<usize>();
        assert_eq!(artifact.summary.total_articles, expected_articles);
        assert_eq!(artifact.summary.total_posts, 1);
    }
}
