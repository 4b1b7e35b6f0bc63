use std::sync::Arc;

use chrono::Utc;
use prysm_core::types::{PodcastArtifact, PodcastStatus, UserArticlesBundle};
use prysm_store::{DocStore, ObjectStore};
use regex::Regex;
use tracing::{info, warn};

use crate::error::Result;
use crate::providers::Providers;

const SCRIPT_MAX_TOKENS: u32 = 2000;
const SCRIPT_TEMPERATURE: f32 = 0.7;
const MODEL: &str = "claude-sonnet-4-6";
const WORDS_PER_MINUTE: u32 = 150;

const LATEST_PODCAST_COLLECTION: &str = "user_audio_connections";
const PODCAST_HISTORY_COLLECTION: &str = "audio_connections";

// Raw regex fragments, not literal phrases: the `(read more|check|find|dive
// deeper)` entry needs its alternation to survive into the compiled pattern.
const LINK_REFERENCE_PHRASES: &[&str] = &[
    "you can (read more|check|find|dive deeper)",
    "check it out",
    "if you're curious",
    "it's worth a peek",
    "don't hesitate to",
    "link in the description",
    "check out the link",
    "for more details, visit",
    "read more at",
];

/// Script Composer (spec §4.5): one LLM call over a user's entire fetched
/// content, cleaned through a fixed post-processing pipeline and written to
/// object store.
pub struct ScriptComposer {
    providers: Providers,
    store: Arc<DocStore>,
    objects: Arc<ObjectStore>,
}

impl ScriptComposer {
    pub fn new(providers: Providers, store: Arc<DocStore>, objects: Arc<ObjectStore>) -> Self {
        Self { providers, store, objects }
    }

    pub async fn compose(
        &self,
        bundle: &UserArticlesBundle,
        presenter_name: &str,
        language: &str,
        voice_id: &str,
    ) -> Result<PodcastArtifact> {
        let system = format!(
            "You are {presenter_name}, hosting a 4-6 minute conversational news podcast in \
            language code '{language}'. Cover every article and community post provided, in a \
            natural spoken voice. Do not use stage directions, timestamps, or bracketed markers \
            of any kind. Do not include links or tell the listener to go read anything."
        );
        let corpus = serde_json::to_string(&bundle.topics_data)
            .unwrap_or_else(|_| "{}".to_string());

        let raw_script = match self
            .providers
            .llm
            .complete(&system, &[("user".to_string(), corpus)], SCRIPT_MAX_TOKENS, SCRIPT_TEMPERATURE, MODEL)
            .await
        {
            Ok(completion) => completion.text,
            Err(e) => {
                warn!(user_id = bundle.user_id, error = %e, "script LLM call failed");
                return Err(e.into());
            }
        };

        let cleaned = clean_script(&raw_script);
        let word_count = cleaned.split_whitespace().count();
        let estimated_duration_secs = (word_count as u32 * 60) / WORDS_PER_MINUTE.max(1);

        let now = Utc::now();
        let stamp = now.format("%Y%m%d_%H%M%S");
        let script_key = format!("podcast_scripts/{}/script_{}.txt", bundle.user_id, stamp);
        let script_url = self.objects.put_object(&script_key, cleaned.as_bytes())?;

        let artifact = PodcastArtifact {
            user_id: bundle.user_id.clone(),
            script_text: cleaned,
            script_url,
            audio_url: None,
            audio_filename: None,
            voice_id: voice_id.to_string(),
            presenter_name: presenter_name.to_string(),
            language: language.to_string(),
            word_count,
            estimated_duration_secs,
            status: PodcastStatus::ScriptGenerated,
            created_at: now,
            audio_generated_at: None,
        };

        self.store.set(LATEST_PODCAST_COLLECTION, &bundle.user_id, &artifact)?;
        self.store.append_history(PODCAST_HISTORY_COLLECTION, &bundle.user_id, &artifact)?;
        info!(user_id = bundle.user_id, word_count = artifact.word_count, "podcast script generated");
        Ok(artifact)
    }
}

/// Fixed 5-step cleanup pipeline applied to raw LLM podcast script output.
fn clean_script(raw: &str) -> String {
    let mut text = raw.to_string();

    // 1. strip any bracketed content, e.g. "[pause]", "[laughs]".
    text = Regex::new(r"\[[^\]]*\]").unwrap().replace_all(&text, "").to_string();

    // 2. strip bold stage directions like "**[SCENE]**" left behind once
    //    brackets are gone, e.g. "****".
    text = Regex::new(r"\*\*\s*\*\*").unwrap().replace_all(&text, "").to_string();

    // 3. strip Markdown links and bare URLs.
    text = Regex::new(r"\[([^\]]*)\]\((https?://[^\)]*)\)").unwrap().replace_all(&text, "$1").to_string();
    text = Regex::new(r"https?://[^\s)]+").unwrap().replace_all(&text, "").to_string();

    // 4. strip link-reference phrases.
    for phrase in LINK_REFERENCE_PHRASES {
        let pattern = format!(r"(?i){}[^.!?]*[.!?]", phrase);
        if let Ok(re) = Regex::new(&pattern) {
            text = re.replace_all(&text, "").to_string();
        }
    }

    // 5. collapse whitespace runs; cap consecutive blank lines at one.
    text = Regex::new(r"[ \t]+").unwrap().replace_all(&text, " ").to_string();
    text = Regex::new(r"\n{3,}").unwrap().replace_all(&text, "\n\n").to_string();

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_script_strips_brackets_and_links() {
        let raw = "Hello [pause] there. [Link](https://example.com) you can check this out. Bye.";
        let cleaned = clean_script(raw);
        assert!(!cleaned.contains('['));
        assert!(!cleaned.contains("https://"));
        assert!(!cleaned.to_lowercase().contains("you can check"));
    }

    #[test]
    fn clean_script_strips_bare_url_and_trailing_punctuation() {
        let raw = "Great coverage. Check it out https://a.b. Hope that helps.";
        let cleaned = clean_script(raw);
        assert!(!cleaned.to_lowercase().contains("check it out"));
        assert!(!cleaned.contains("https://"));
    }

    #[test]
    fn clean_script_collapses_blank_lines() {
        let raw = "Line one.\n\n\n\nLine two.";
        let cleaned = clean_script(raw);
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn clean_script_collapses_repeated_spaces() {
        let raw = "Too     many     spaces.";
        let cleaned = clean_script(raw);
        assert_eq!(cleaned, "Too many spaces.");
    }
}
