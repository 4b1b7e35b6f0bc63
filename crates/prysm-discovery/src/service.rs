use std::sync::Arc;

use prysm_core::locale::language_phrases;
use prysm_core::types::UserPreferences;
use prysm_preferences::PreferenceStore;
use prysm_providers::LlmProvider;
use tracing::{info, warn};

use crate::entities::extract_entities;
use crate::error::Result;

const DISCOVERY_MAX_TOKENS: u32 = 150;
const DISCOVERY_TEMPERATURE: f32 = 0.6;
const MODEL: &str = "claude-sonnet-4-6";

/// Turn-level request into the discovery service (spec §4.10).
pub struct DiscoveryTurn<'a> {
    pub user_id: &'a str,
    pub user_preferences: &'a UserPreferences,
    pub conversation_history: &'a [(String, String)],
    pub user_message: &'a str,
    pub language: &'a str,
}

/// `{ai_message, conversation_ending, ready_for_news, usage}` returned to
/// the `answer` endpoint.
#[derive(Debug, Clone)]
pub struct DiscoveryResponse {
    pub ai_message: String,
    pub conversation_ending: bool,
    pub ready_for_news: bool,
    pub tokens_in: u32,
    pub tokens_out: u32,
}

/// Conversational Preference-Discovery Service (spec §4.10). Separate from
/// the update pipeline: interviews the user about their interests, forbids
/// news content in its own replies, and inline-extracts named entities on
/// the same turn so the caller sees updated totals on the next `get`.
pub struct DiscoveryService {
    llm: Arc<dyn LlmProvider>,
    preferences: Arc<PreferenceStore>,
}

impl DiscoveryService {
    pub fn new(llm: Arc<dyn LlmProvider>, preferences: Arc<PreferenceStore>) -> Self {
        Self { llm, preferences }
    }

    pub async fn answer(&self, turn: DiscoveryTurn<'_>) -> Result<DiscoveryResponse> {
        let system = build_system_prompt(turn.language, turn.user_preferences);

        let mut messages: Vec<(String, String)> = turn.conversation_history.to_vec();
        messages.push(("user".to_string(), turn.user_message.to_string()));

        let completion = self
            .llm
            .complete(&system, &messages, DISCOVERY_MAX_TOKENS, DISCOVERY_TEMPERATURE, MODEL)
            .await?;

        let phrases = language_phrases(turn.language);
        let lowered = completion.text.to_lowercase();
        let conversation_ending = phrases.ending_phrases.iter().any(|p| lowered.contains(p));
        let ready_for_news = phrases.ready_phrases.iter().any(|p| lowered.contains(p));

        // Inline, synchronous entity extraction on the same turn.
        match extract_entities(self.llm.as_ref(), turn.user_message, turn.language).await {
            Ok(entities) if !entities.is_empty() => {
                self.preferences.update_specific_subjects(turn.user_id, &entities)?;
                info!(user_id = turn.user_id, count = entities.len(), "extracted specific subjects");
            }
            Ok(_) => {}
            Err(e) => warn!(user_id = turn.user_id, error = %e, "entity extraction failed, continuing"),
        }

        Ok(DiscoveryResponse {
            ai_message: completion.text,
            conversation_ending,
            ready_for_news,
            tokens_in: completion.usage.tokens_in,
            tokens_out: completion.usage.tokens_out,
        })
    }
}

fn build_system_prompt(language: &str, prefs: &UserPreferences) -> String {
    let topics: Vec<&str> = prefs.preferences.keys().map(|s| s.as_str()).collect();
    format!(
        "You are a friendly onboarding interviewer helping a user refine their news \
        preferences, responding in language code '{language}'. You must NOT discuss or \
        summarize any actual news content. Ask short, concrete questions to surface \
        specific interests: companies, people, products, and events the user cares about. \
        The user's current topics are: {}. Keep replies brief.",
        if topics.is_empty() { "none yet".to_string() } else { topics.join(", ") }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use prysm_core::types::{CURRENT_FORMAT_VERSION, PreferencesTree};
    use prysm_store::DocStore;
    use rusqlite::Connection;

    struct StubLlm {
        reply: String,
    }

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
                text: self.reply.clone(),
                usage: prysm_providers::ChatUsage { tokens_in: 10, tokens_out: 20 },
            })
        }
    }

    fn sample_preferences() -> UserPreferences {
        UserPreferences {
            user_id: "u1".to_string(),
            preferences: PreferencesTree::new(),
            detail_level: Default::default(),
            language: "en".to_string(),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
            updated_at: Utc::now(),
            specific_subjects: Default::default(),
        }
    }

    #[tokio::test]
    async fn answer_detects_ready_for_news_phrase() {
        let llm: Arc<dyn LlmProvider> = Arc::new(StubLlm {
            reply: "Great, let's get your news started!".to_string(),
        });
        let store = Arc::new(DocStore::new(Connection::open_in_memory().unwrap()).unwrap());
        let preferences = Arc::new(PreferenceStore::new(store));
        let service = DiscoveryService::new(llm, preferences);

        let prefs = sample_preferences();
        let response = service
            .answer(DiscoveryTurn {
                user_id: "u1",
                user_preferences: &prefs,
                conversation_history: &[],
                user_message: "I love Tesla and SpaceX news.",
                language: "en",
            })
            .await
            .unwrap();

        assert!(response.ready_for_news);
        assert!(!response.conversation_ending);
    }
}
