//! `prysm-providers` — async clients for every external collaborator the
//! pipeline calls: news search, community/forum, LLM chat, text-to-speech,
//! and mobile push. One shared error taxonomy (`ProviderError`), one
//! `async_trait` per concern.

pub mod community;
pub mod error;
pub mod llm;
pub mod news;
pub mod push;
pub mod traits;
pub mod tts;

pub use error::{ProviderError, Result};
pub use traits::{
    ChatCompletion, ChatUsage, CommunityProvider, LlmProvider, NewsProvider, NewsSearchResult,
    PlatformOpts, PushOutcome, PushProvider, TimePeriod, TtsProvider,
};

pub use community::RedditProvider;
pub use llm::AnthropicChatClient;
pub use news::GNewsProvider;
pub use push::FcmPushClient;
pub use tts::ElevenLabsTtsClient;
