use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much detail the user wants in generated summaries (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Light,
    #[default]
    Medium,
    Detailed,
}

impl std::fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailLevel::Light => write!(f, "light"),
            DetailLevel::Medium => write!(f, "medium"),
            DetailLevel::Detailed => write!(f, "detailed"),
        }
    }
}

/// A subtopic's two content sources: free-text `queries` and `subreddits`
/// (community names). Both are always present, possibly empty (§3 invariant).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SubtopicPrefs {
    #[serde(default)]
    pub subreddits: Vec<String>,
    #[serde(default)]
    pub queries: Vec<String>,
}

/// `Map<Topic, Map<Subtopic, SubtopicPrefs>>` — the v3.0 nested preferences
/// shape (spec §9: "dynamic dictionaries... become a three-level typed
/// structure").
pub type PreferencesTree = BTreeMap<String, BTreeMap<String, SubtopicPrefs>>;

pub const CURRENT_FORMAT_VERSION: &str = "3.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    pub preferences: PreferencesTree,
    #[serde(default)]
    pub detail_level: DetailLevel,
    #[serde(default = "default_language")]
    pub language: String,
    pub format_version: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub specific_subjects: BTreeSet<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl UserPreferences {
    /// An empty v3.0 skeleton, returned by `get_user_preferences` when the
    /// user has never saved preferences (spec §6).
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            preferences: BTreeMap::new(),
            detail_level: DetailLevel::default(),
            language: default_language(),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
            updated_at: Utc::now(),
            specific_subjects: BTreeSet::new(),
        }
    }

    pub fn topics_count(&self) -> usize {
        self.preferences.len()
    }

    pub fn subtopics_count(&self) -> usize {
        self.preferences.values().map(|m| m.len()).sum()
    }
}

/// A user's podcast/update scheduling cadence (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn from_chrono(w: chrono::Weekday) -> Self {
        match w {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingPreferences {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    pub hour: u8,
    pub minute: u8,
    /// Required when `kind == Weekly`; ignored for `Daily`.
    pub day: Option<Weekday>,
}

impl Default for SchedulingPreferences {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            kind: ScheduleKind::Daily,
            hour: 9,
            minute: 0,
            day: None,
        }
    }
}

/// A single fetched news article (spec §3). Transient — only ever persisted
/// inside a `TopicArtifact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityComment {
    pub body: String,
    pub author: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub replies_count: u32,
    pub is_submitter: bool,
    #[serde(default)]
    pub distinguished: Option<String>,
    pub stickied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    pub title: String,
    pub score: i64,
    pub permalink: String,
    pub community: String,
    pub created_at: DateTime<Utc>,
    pub num_comments: u32,
    pub author: String,
    pub selftext: String,
    #[serde(default)]
    pub comments: Option<Vec<CommunityComment>>,
}

/// Produced by the Content Fetcher for one (topic, subtopic) pair.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubtopicArtifact {
    pub subtopic_name: String,
    #[serde(default)]
    pub articles_for_subtopic_name: Vec<Article>,
    #[serde(default)]
    pub queries: BTreeMap<String, Vec<Article>>,
    #[serde(default)]
    pub communities: BTreeMap<String, Vec<CommunityPost>>,
}

impl SubtopicArtifact {
    pub fn article_count(&self) -> usize {
        self.articles_for_subtopic_name.len() + self.queries.values().map(|v| v.len()).sum::<usize>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicArtifactSummary {
    pub total_articles: usize,
    pub total_posts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicWarnings {
    #[serde(default)]
    pub quota_exceeded: bool,
}

/// Produced by the Content Fetcher for one topic.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicArtifact {
    pub topic_name: String,
    #[serde(default)]
    pub topic_headlines: Vec<Article>,
    #[serde(default)]
    pub subtopics: BTreeMap<String, SubtopicArtifact>,
    #[serde(default)]
    pub summary: TopicArtifactSummary,
    #[serde(default)]
    pub warnings: TopicWarnings,
}

impl TopicArtifact {
    /// Recompute `summary.total_articles` from the current content.
    /// Invariant from spec §8: `total_articles = |topic_headlines| +
    /// sum(|subtopic_articles| + sum(|query_articles|))`.
    pub fn recompute_summary(&mut self) {
        let mut total_articles = self.topic_headlines.len();
        let mut total_posts = 0usize;
        for sub in self.subtopics.values() {
            total_articles += sub.article_count();
            total_posts += sub.communities.values().map(|v| v.len()).sum::<usize>();
        }
        self.summary = TopicArtifactSummary {
            total_articles,
            total_posts,
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BundleSummary {
    pub topics_processed: usize,
    pub total_articles: usize,
    pub total_posts: usize,
    pub language: String,
    pub country: String,
}

/// Persisted once per refresh, keyed by `user_id` (overwritten).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserArticlesBundle {
    pub user_id: String,
    pub refresh_timestamp: DateTime<Utc>,
    pub topics_data: BTreeMap<String, TopicArtifact>,
    pub summary: BundleSummary,
}

impl UserArticlesBundle {
    pub fn recompute_summary(&mut self, language: &str, country: &str) {
        let total_articles = self
            .topics_data
            .values()
            .map(|t| t.summary.total_articles)
            .sum();
        let total_posts = self
            .topics_data
            .values()
            .map(|t| t.summary.total_posts)
            .sum();
        self.summary = BundleSummary {
            topics_processed: self.topics_data.len(),
            total_articles,
            total_posts,
            language: language.to_string(),
            country: country.to_string(),
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubtopicReport {
    pub subtopic_summary: String,
    pub community_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationStats {
    pub llm_calls: u32,
    pub llm_failures: u32,
    pub tokens_in: u32,
    pub tokens_out: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicReport {
    pub pickup_line: String,
    pub topic_summary: String,
    pub subtopics: BTreeMap<String, SubtopicReport>,
    pub generation_stats: GenerationStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReportBundle {
    pub user_id: String,
    pub reports: BTreeMap<String, TopicReport>,
    pub generation_stats: GenerationStats,
    pub refresh_timestamp: DateTime<Utc>,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodcastStatus {
    ScriptGenerated,
    CompletePodcastGenerated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastArtifact {
    pub user_id: String,
    pub script_text: String,
    pub script_url: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub audio_filename: Option<String>,
    pub voice_id: String,
    pub presenter_name: String,
    pub language: String,
    pub word_count: usize,
    /// Estimated duration in seconds, assuming ~150 words/minute narration.
    pub estimated_duration_secs: u32,
    pub status: PodcastStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub audio_generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceBinding {
    pub user_id: String,
    pub fcm_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_artifact_total_articles_invariant() {
        let mut topic = TopicArtifact {
            topic_name: "technology".to_string(),
            topic_headlines: vec![sample_article(), sample_article()],
            ..Default::default()
        };
        let mut sub = SubtopicArtifact {
            subtopic_name: "AI".to_string(),
            articles_for_subtopic_name: vec![sample_article()],
            ..Default::default()
        };
        sub.queries
            .insert("gpt".to_string(), vec![sample_article(), sample_article()]);
        topic.subtopics.insert("AI".to_string(), sub);
        topic.recompute_summary();
        assert_eq!(topic.summary.total_articles, 2 + 1 + 2);
    }

    fn sample_article() -> Article {
        Article {
            title: "t".to_string(),
            url: "https://example.com".to_string(),
            source_name: "Example".to_string(),
            published_at: Utc::now(),
            snippet: None,
            image_url: None,
            content: None,
        }
    }
}
