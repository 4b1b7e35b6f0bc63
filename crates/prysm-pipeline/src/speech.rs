use std::sync::Arc;

use chrono::Utc;
use prysm_core::types::{PodcastArtifact, PodcastStatus};
use prysm_store::{DocStore, ObjectStore};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::providers::Providers;

const LATEST_PODCAST_COLLECTION: &str = "user_audio_connections";
const PODCAST_HISTORY_COLLECTION: &str = "audio_connections";
const AUDIO_POINTER_COLLECTION: &str = "audio";
const DEFAULT_TTS_MODEL: &str = "eleven_turbo_v2";
const AUDIO_FORMAT: &str = "mp3_44100_128";

#[derive(serde::Serialize, serde::Deserialize)]
struct AudioPointer {
    latest_podcast_url: String,
}

/// Speech Synthesizer (spec §4.6): turns the just-composed script into
/// audio and updates the latest `PodcastArtifact` pointer in place.
pub struct SpeechSynthesizer {
    providers: Providers,
    store: Arc<DocStore>,
    objects: Arc<ObjectStore>,
}

impl SpeechSynthesizer {
    pub fn new(providers: Providers, store: Arc<DocStore>, objects: Arc<ObjectStore>) -> Self {
        Self { providers, store, objects }
    }

    pub async fn synthesize(&self, mut artifact: PodcastArtifact) -> Result<PodcastArtifact> {
        let audio_bytes = match self
            .providers
            .tts
            .synthesize(&artifact.script_text, &artifact.voice_id, DEFAULT_TTS_MODEL, AUDIO_FORMAT)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(user_id = artifact.user_id, error = %e, "tts synthesis failed");
                return Err(PipelineError::Provider(e));
            }
        };

        let now = Utc::now();
        let stamp = now.format("%Y%m%d_%H%M%S");
        let filename = format!("podcast_{}.mp3", stamp);
        let audio_key = format!("podcast_audio/{}/{}", artifact.user_id, filename);
        let audio_url = self.objects.put_object(&audio_key, &audio_bytes)?;

        artifact.audio_url = Some(audio_url);
        artifact.audio_filename = Some(filename);
        artifact.audio_generated_at = Some(now);
        artifact.status = PodcastStatus::CompletePodcastGenerated;

        self.store.set(LATEST_PODCAST_COLLECTION, &artifact.user_id, &artifact)?;
        self.store.append_history(PODCAST_HISTORY_COLLECTION, &artifact.user_id, &artifact)?;

        let pointer = AudioPointer {
            latest_podcast_url: artifact.audio_url.clone().unwrap_or_default(),
        };
        self.store.set(AUDIO_POINTER_COLLECTION, &artifact.user_id, &pointer)?;

        info!(user_id = artifact.user_id, bytes = audio_bytes.len(), "podcast audio generated");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rusqlite::Connection;

    struct StubTts;
    #[async_trait]
    impl prysm_providers::TtsProvider for StubTts {
        fn name(&self) -> &'static str {
            "stub"
        }
        async fn synthesize(
            &self,
            _text: &str,
            _voice_id: &str,
            _model_id: &str,
            _format: &str,
        ) -> prysm_providers::Result<Vec<u8>> {
            Ok(vec![1, 2, 3, 4])
        }
    }

    struct FailingTts;
    #[async_trait]
    impl prysm_providers::TtsProvider for FailingTts {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn synthesize(
            &self,
            _text: &str,
            _voice_id: &str,
            _model_id: &str,
            _format: &str,
        ) -> prysm_providers::Result<Vec<u8>> {
            Err(prysm_providers::ProviderError::Transient {
                provider: "failing",
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    fn sample_artifact() -> PodcastArtifact {
        PodcastArtifact {
            user_id: "u1".to_string(),
            script_text: "hello listeners".to_string(),
            script_url: "http://localhost/objects/podcast_scripts/u1/script_x.txt".to_string(),
            audio_url: None,
            audio_filename: None,
            voice_id: "voice-1".to_string(),
            presenter_name: "Alex".to_string(),
            language: "en".to_string(),
            word_count: 2,
            estimated_duration_secs: 1,
            status: PodcastStatus::ScriptGenerated,
            created_at: Utc::now(),
            audio_generated_at: None,
        }
    }

    fn synthesizer_with(tts: Arc<dyn prysm_providers::TtsProvider>) -> SpeechSynthesizer {
        use prysm_providers::{CommunityProvider, LlmProvider, NewsProvider, PushProvider};

        struct Noop;
        #[async_trait]
        impl NewsProvider for Noop {
            fn name(&self) -> &'static str { "noop" }
            async fn search(&self, _q: &str, _l: &str, _c: &str, _m: u32, _tp: Option<prysm_providers::TimePeriod>, _tok: Option<&str>) -> prysm_providers::Result<prysm_providers::NewsSearchResult> { unimplemented!() }
        }
        #[async_trait]
        impl CommunityProvider for Noop {
            fn name(&self) -> &'static str { "noop" }
            async fn hot(&self, _c: &str, _l: u32) -> prysm_providers::Result<Vec<prysm_core::types::CommunityPost>> { unimplemented!() }
            async fn top_comments(&self, _p: &str, _l: u32) -> prysm_providers::Result<Vec<prysm_core::types::CommunityComment>> { unimplemented!() }
        }
        #[async_trait]
        impl LlmProvider for Noop {
            fn name(&self) -> &'static str { "noop" }
            async fn complete(&self, _s: &str, _m: &[(String, String)], _mt: u32, _t: f32, _model: &str) -> prysm_providers::Result<prysm_providers::ChatCompletion> { unimplemented!() }
        }
        #[async_trait]
        impl PushProvider for Noop {
            fn name(&self) -> &'static str { "noop" }
            async fn send(&self, _d: &str, _t: &str, _b: &str, _o: &prysm_providers::PlatformOpts) -> prysm_providers::Result<prysm_providers::PushOutcome> { unimplemented!() }
        }

        let providers = Providers {
            news: Arc::new(Noop),
            community: Arc::new(Noop),
            llm: Arc::new(Noop),
            tts,
            push: Arc::new(Noop),
        };
        let store = Arc::new(DocStore::new(Connection::open_in_memory().unwrap()).unwrap());
        let objects = Arc::new(
            ObjectStore::new(
                std::env::temp_dir().join(format!("prysm-speech-test-{}", std::process::id())),
                "http://localhost/objects",
            )
            .unwrap(),
        );
        SpeechSynthesizer::new(providers, store, objects)
    }

    #[tokio::test]
    async fn synthesize_updates_status_and_writes_audio() {
        let synth = synthesizer_with(Arc::new(StubTts));
        let artifact = synth.synthesize(sample_artifact()).await.unwrap();
        assert_eq!(artifact.status, PodcastStatus::CompletePodcastGenerated);
        assert!(artifact.audio_url.is_some());
        assert!(artifact.audio_generated_at.is_some());

        let pointer: AudioPointer = synth
            .store
            .get(AUDIO_POINTER_COLLECTION, &artifact.user_id)
            .unwrap()
            .unwrap();
        assert_eq!(pointer.latest_podcast_url, artifact.audio_url.unwrap());
    }

    #[tokio::test]
    async fn synthesize_propagates_tts_failure_and_leaves_script_status() {
        let synth = synthesizer_with(Arc::new(FailingTts));
        let original = sample_artifact();
        let result = synth.synthesize(original.clone()).await;
        assert!(result.is_err());
        assert_eq!(original.status, PodcastStatus::ScriptGenerated);
    }
}
