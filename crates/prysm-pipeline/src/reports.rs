use std::sync::Arc;

use prysm_core::types::{
    CommunityPost, GenerationStats, SubtopicReport, TopicArtifact, TopicReport, UserArticlesBundle,
    UserReportBundle,
};
use prysm_store::DocStore;
use tracing::warn;

use crate::error::Result;
use crate::providers::Providers;

const PICKUP_LINE_MAX_TOKENS: u32 = 50;
const PICKUP_LINE_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 150;
const SUMMARY_TEMPERATURE: f32 = 0.4;
const PULSE_MAX_TOKENS: u32 = 220;
const PULSE_TEMPERATURE: f32 = 0.4;
const MAX_HEADLINES: usize = 6;
const MAX_QUERY_KEYWORDS: usize = 5;
const SELFTEXT_TRUNCATE: usize = 280;
const MODEL: &str = "claude-sonnet-4-6";
const REPORTS_COLLECTION: &str = "aifeed";

const PERSONAL_KEYWORDS: &[&str] = &[
    "my wife", "my husband", "my kid", "my mom", "my dad", "am i", "aita", "advice needed",
];

const WORLD_COMMUNITIES: &[&str] = &["worldnews", "news", "politics", "economics", "technology", "business"];

const WORLD_KEYWORDS: &[&str] = &[
    "election", "war", "ceasefire", "inflation", "interest rate", "sanctions", "summit", "treaty",
];

const HOT_TOPIC_CANDIDATES: &[&str] = &[
    "election", "war", "inflation", "ai", "climate", "ceasefire", "tariffs", "recession",
];

/// Report Builder (spec §4.4): reduces a fetched `TopicArtifact`/
/// `UserArticlesBundle` into layered LLM-generated summaries. Each sub-call
/// is independent — a failed LLM call degrades to a fallback string rather
/// than failing the whole report.
pub struct ReportBuilder {
    providers: Providers,
    store: Arc<DocStore>,
}

impl ReportBuilder {
    pub fn new(providers: Providers, store: Arc<DocStore>) -> Self {
        Self { providers, store }
    }

    /// Up to 6 top headlines + up to 5 trending query keywords → a 3-5
    /// word factual title. Falls back to `"Latest {topic} updates"`.
    pub async fn pickup_line(&self, topic: &TopicArtifact, stats: &mut GenerationStats) -> String {
        let headlines: Vec<&str> = topic
            .topic_headlines
            .iter()
            .take(MAX_HEADLINES)
            .map(|a| a.title.as_str())
            .collect();
        let keywords: Vec<&str> = topic
            .subtopics
            .values()
            .flat_map(|sub| sub.queries.keys())
            .take(MAX_QUERY_KEYWORDS)
            .map(|s| s.as_str())
            .collect();

        if headlines.is_empty() && keywords.is_empty() {
            return format!("Latest {} updates", topic.topic_name);
        }

        let system = "You write short, factual, 3-5 word news headlines. No emojis. Never use the word BREAKING.";
        let user = format!(
            "Topic: {}\nHeadlines:\n{}\nTrending: {}",
            topic.topic_name,
            headlines.join("\n"),
            keywords.join(", ")
        );

        stats.llm_calls += 1;
        match self
            .providers
            .llm
            .complete(system, &[("user".to_string(), user)], PICKUP_LINE_MAX_TOKENS, PICKUP_LINE_TEMPERATURE, MODEL)
            .await
        {
            Ok(completion) => {
                stats.tokens_in += completion.usage.tokens_in;
                stats.tokens_out += completion.usage.tokens_out;
                let trimmed = completion.text.trim();
                if trimmed.is_empty() {
                    format!("Latest {} updates", topic.topic_name)
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                warn!(topic = topic.topic_name, error = %e, "pickup line LLM call failed");
                stats.llm_failures += 1;
                format!("Latest {} updates", topic.topic_name)
            }
        }
    }

    /// Flatten a `TopicArtifact` into a labeled corpus and ask for a
    /// Markdown-lite summary with dynamically named sections.
    pub async fn topic_summary(&self, topic: &TopicArtifact, stats: &mut GenerationStats) -> String {
        let corpus = flatten_topic_corpus(topic);
        if corpus.trim().is_empty() {
            return format!("**{} Summary**\n\nNo new stories to report today.", topic.topic_name);
        }

        let system = "You write concise Markdown-lite news summaries. Output a bold header \
            '**{topic} Summary**' followed by 2-3 bullet-point sections whose titles you invent \
            to match the actual content. Do not use generic section titles. Keep the whole \
            summary under 100 words.";
        stats.llm_calls += 1;
        match self
            .providers
            .llm
            .complete(system, &[("user".to_string(), corpus)], SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE, MODEL)
            .await
        {
            Ok(completion) => {
                stats.tokens_in += completion.usage.tokens_in;
                stats.tokens_out += completion.usage.tokens_out;
                completion.text.trim().to_string()
            }
            Err(e) => {
                warn!(topic = topic.topic_name, error = %e, "topic summary LLM call failed");
                stats.llm_failures += 1;
                format!("**{} Summary**\n\nSummary unavailable right now.", topic.topic_name)
            }
        }
    }

    /// Subtopic summary uses the same algorithm as `topic_summary`, applied
    /// to one subtopic's direct articles union all of its query articles.
    pub async fn subtopic_summary(
        &self,
        subtopic_name: &str,
        articles: &[prysm_core::types::Article],
        stats: &mut GenerationStats,
    ) -> String {
        if articles.is_empty() {
            return format!("No new {} stories today.", subtopic_name);
        }
        let corpus = articles
            .iter()
            .map(|a| format!("- {} ({})", a.title, a.source_name))
            .collect::<Vec<_>>()
            .join("\n");

        let system = "Summarize these articles for one subtopic in under 100 words, Markdown-lite, bold header then bullets.";
        stats.llm_calls += 1;
        match self
            .providers
            .llm
            .complete(system, &[("user".to_string(), corpus)], SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE, MODEL)
            .await
        {
            Ok(completion) => {
                stats.tokens_in += completion.usage.tokens_in;
                stats.tokens_out += completion.usage.tokens_out;
                completion.text.trim().to_string()
            }
            Err(e) => {
                warn!(subtopic_name, error = %e, "subtopic summary LLM call failed");
                stats.llm_failures += 1;
                format!("Summary unavailable for {} right now.", subtopic_name)
            }
        }
    }

    /// "Reddit world summary": filter posts to those that are world-ish
    /// (community, keyword, or score > 100) and not predominantly personal,
    /// then summarize with a `Key Developments:` header.
    pub async fn community_pulse(
        &self,
        posts: &[CommunityPost],
        stats: &mut GenerationStats,
    ) -> (String, Vec<String>) {
        let retained: Vec<&CommunityPost> = posts.iter().filter(|p| is_world_relevant(p)).collect();
        if retained.is_empty() {
            return ("No notable community discussion today.".to_string(), Vec::new());
        }

        let corpus = retained
            .iter()
            .map(|p| {
                let body = truncate(&p.selftext, SELFTEXT_TRUNCATE);
                format!("- [{}] {} (score {})\n  {}", p.community, p.title, p.score, body)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let key_topics: Vec<String> = HOT_TOPIC_CANDIDATES
            .iter()
            .filter(|kw| corpus.to_lowercase().contains(*kw))
            .map(|s| s.to_string())
            .collect();

        let system = "Summarize world/news community discussion in under 150 words. Bold header \
            'Key Developments:' followed by bullet points.";
        stats.llm_calls += 1;
        let summary = match self
            .providers
            .llm
            .complete(system, &[("user".to_string(), corpus)], PULSE_MAX_TOKENS, PULSE_TEMPERATURE, MODEL)
            .await
        {
            Ok(completion) => {
                stats.tokens_in += completion.usage.tokens_in;
                stats.tokens_out += completion.usage.tokens_out;
                completion.text.trim().to_string()
            }
            Err(e) => {
                warn!(error = %e, "community pulse LLM call failed");
                stats.llm_failures += 1;
                "**Key Developments:**\n\nCommunity pulse unavailable right now.".to_string()
            }
        };
        (summary, key_topics)
    }

    /// Compose pickup_line + topic_summary + per-subtopic reports for one
    /// topic. Each sub-call is independent.
    pub async fn complete_topic_report(&self, topic: &TopicArtifact) -> TopicReport {
        let mut stats = GenerationStats::default();
        let pickup_line = self.pickup_line(topic, &mut stats).await;
        let topic_summary = self.topic_summary(topic, &mut stats).await;

        let mut subtopics = std::collections::BTreeMap::new();
        for (name, artifact) in &topic.subtopics {
            let mut combined = artifact.articles_for_subtopic_name.clone();
            for articles in artifact.queries.values() {
                combined.extend(articles.clone());
            }
            let subtopic_summary = self.subtopic_summary(name, &combined, &mut stats).await;

            let all_posts: Vec<CommunityPost> = artifact.communities.values().flatten().cloned().collect();
            let (community_summary, _key_topics) = self.community_pulse(&all_posts, &mut stats).await;

            subtopics.insert(
                name.clone(),
                SubtopicReport { subtopic_summary, community_summary },
            );
        }

        TopicReport {
            pickup_line,
            topic_summary,
            subtopics,
            generation_stats: stats,
        }
    }

    /// Iterate topics from the persisted `UserArticlesBundle`, build a
    /// complete report per topic, aggregate, and persist keyed by user_id.
    pub async fn complete_user_report(&self, bundle: &UserArticlesBundle) -> Result<UserReportBundle> {
        let mut reports = std::collections::BTreeMap::new();
        let mut total_stats = GenerationStats::default();

        for (topic_name, topic) in &bundle.topics_data {
            let report = self.complete_topic_report(topic).await;
            total_stats.llm_calls += report.generation_stats.llm_calls;
            total_stats.llm_failures += report.generation_stats.llm_failures;
            total_stats.tokens_in += report.generation_stats.tokens_in;
            total_stats.tokens_out += report.generation_stats.tokens_out;
            reports.insert(topic_name.clone(), report);
        }

        let result = UserReportBundle {
            user_id: bundle.user_id.clone(),
            reports,
            generation_stats: total_stats,
            refresh_timestamp: bundle.refresh_timestamp,
            language: bundle.summary.language.clone(),
        };

        self.store.set(REPORTS_COLLECTION, &bundle.user_id, &result)?;
        Ok(result)
    }
}

fn flatten_topic_corpus(topic: &TopicArtifact) -> String {
    let mut lines = Vec::new();
    for headline in &topic.topic_headlines {
        lines.push(format!("[headline] {} ({})", headline.title, headline.source_name));
    }
    for (subtopic_name, artifact) in &topic.subtopics {
        for article in &artifact.articles_for_subtopic_name {
            lines.push(format!("[{subtopic_name}] {} ({})", article.title, article.source_name));
        }
        for (query, articles) in &artifact.queries {
            for article in articles {
                lines.push(format!("[{subtopic_name}/{query}] {}", article.title));
            }
        }
        for (community, posts) in &artifact.communities {
            for post in posts {
                lines.push(format!(
                    "[r/{community}] {} (score {}) {}",
                    post.title,
                    post.score,
                    truncate(&post.selftext, SELFTEXT_TRUNCATE)
                ));
            }
        }
    }
    lines.join("\n")
}

fn is_world_relevant(post: &CommunityPost) -> bool {
    if is_personal(post) {
        return false;
    }
    let community = post.community.to_lowercase();
    if WORLD_COMMUNITIES.contains(&community.as_str()) {
        return true;
    }
    let haystack = format!("{} {}", post.title, post.selftext).to_lowercase();
    if WORLD_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        return true;
    }
    post.score > 100
}

fn is_personal(post: &CommunityPost) -> bool {
    let haystack = format!("{} {}", post.title, post.selftext).to_lowercase();
    PERSONAL_KEYWORDS.iter().any(|kw| haystack.contains(kw))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rusqlite::Connection;

    struct FailingLlm;
    #[async_trait]
    impl prysm_providers::LlmProvider for FailingLlm {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn complete(
            &self,
            _system: &str,
            _messages: &[(String, String)],
            _max_tokens: u32,
            _temperature: f32,
            _model: &str,
        ) -> prysm_providers::Result<prysm_providers::ChatCompletion> {
            Err(prysm_providers::ProviderError::Transient {
                provider: "failing",
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    fn sample_article(title: &str) -> prysm_core::types::Article {
        prysm_core::types::Article {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            source_name: "Example".to_string(),
            published_at: Utc::now(),
            snippet: None,
            image_url: None,
            content: None,
        }
    }

    fn builder_with_failing_llm() -> ReportBuilder {
        let providers = super::Providers {
            news: Arc::new(NoopNews),
            community: Arc::new(NoopCommunity),
            llm: Arc::new(FailingLlm),
            tts: Arc::new(NoopTts),
            push: Arc::new(NoopPush),
        };
        let store = Arc::new(DocStore::new(Connection::open_in_memory().unwrap()).unwrap());
        ReportBuilder::new(providers, store)
    }

    struct NoopNews;
    #[async_trait]
    impl prysm_providers::NewsProvider for NoopNews {
        fn name(&self) -> &'static str { "noop" }
        async fn search(
            &self, _q: &str, _l: &str, _c: &str, _m: u32,
            _tp: Option<prysm_providers::TimePeriod>, _tok: Option<&str>,
        ) -> prysm_providers::Result<prysm_providers::NewsSearchResult> {
            unimplemented!()
        }
    }
    struct NoopCommunity;
    #[async_trait]
    impl prysm_providers::CommunityProvider for NoopCommunity {
        fn name(&self) -> &'static str { "noop" }
        async fn hot(&self, _c: &str, _l: u32) -> prysm_providers::Result<Vec<CommunityPost>> { unimplemented!() }
        async fn top_comments(&self, _p: &str, _l: u32) -> prysm_providers::Result<Vec<prysm_core::types::CommunityComment>> { unimplemented!() }
    }
    struct NoopTts;
    #[async_trait]
    impl prysm_providers::TtsProvider for NoopTts {
        fn name(&self) -> &'static str { "noop" }
        async fn synthesize(&self, _t: &str, _v: &str, _m: &str, _f: &str) -> prysm_providers::Result<Vec<u8>> { unimplemented!() }
    }
    struct NoopPush;
    #[async_trait]
    impl prysm_providers::PushProvider for NoopPush {
        fn name(&self) -> &'static str { "noop" }
        async fn send(&self, _d: &str, _t: &str, _b: &str, _o: &prysm_providers::PlatformOpts) -> prysm_providers::Result<prysm_providers::PushOutcome> { unimplemented!() }
    }

    #[tokio::test]
    async fn pickup_line_falls_back_on_empty_topic() {
        let builder = builder_with_failing_llm();
        let topic = TopicArtifact { topic_name: "technology".to_string(), ..Default::default() };
        let mut stats = GenerationStats::default();
        let line = builder.pickup_line(&topic, &mut stats).await;
        assert_eq!(line, "Latest technology updates");
        assert_eq!(stats.llm_calls, 0);
    }

    #[tokio::test]
    async fn pickup_line_falls_back_on_llm_failure() {
        let builder = builder_with_failing_llm();
        let topic = TopicArtifact {
            topic_name: "technology".to_string(),
            topic_headlines: vec![sample_article("AI breakthrough")],
            ..Default::default()
        };
        let mut stats = GenerationStats::default();
        let line = builder.pickup_line(&topic, &mut stats).await;
        assert_eq!(line, "Latest technology updates");
        assert_eq!(stats.llm_failures, 1);
    }

    #[tokio::test]
    async fn topic_summary_falls_back_on_llm_failure() {
        let builder = builder_with_failing_llm();
        let topic = TopicArtifact {
            topic_name: "business".to_string(),
            topic_headlines: vec![sample_article("Markets rally")],
            ..Default::default()
        };
        let mut stats = GenerationStats::default();
        let summary = builder.topic_summary(&topic, &mut stats).await;
        assert!(summary.contains("Summary unavailable"));
    }

    #[test]
    fn is_world_relevant_filters_personal_posts() {
        let personal = CommunityPost {
            title: "AITA for telling my wife the truth".to_string(),
            score: 5,
            permalink: "/r/aita/1".to_string(),
            community: "AmItheAsshole".to_string(),
            created_at: Utc::now(),
            num_comments: 3,
            author: "anon".to_string(),
            selftext: String::new(),
            comments: None,
        };
        assert!(!is_world_relevant(&personal));
    }

    #[test]
    fn is_world_relevant_keeps_high_score_posts() {
        let viral = CommunityPost {
            title: "Something happened".to_string(),
            score: 500,
            permalink: "/r/pics/1".to_string(),
            community: "pics".to_string(),
            created_at: Utc::now(),
            num_comments: 10,
            author: "anon".to_string(),
            selftext: String::new(),
            comments: None,
        };
        assert!(is_world_relevant(&viral));
    }
}
