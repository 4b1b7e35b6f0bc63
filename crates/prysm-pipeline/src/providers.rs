use std::sync::Arc;

use prysm_providers::{CommunityProvider, LlmProvider, NewsProvider, PushProvider, TtsProvider};

/// The external collaborators every pipeline stage is injected with,
/// composed once at startup (spec §9: "process-wide singletons... are
/// re-architected as explicit dependency-injected collaborators passed to
/// each component").
#[derive(Clone)]
pub struct Providers {
    pub news: Arc<dyn NewsProvider>,
    pub community: Arc<dyn CommunityProvider>,
    pub llm: Arc<dyn LlmProvider>,
    pub tts: Arc<dyn TtsProvider>,
    pub push: Arc<dyn PushProvider>,
}
