use std::sync::Arc;

use prysm_core::types::DeviceBinding;
use prysm_providers::{PlatformOpts, ProviderError, PushOutcome};
use prysm_store::DocStore;
use tracing::{info, warn};

use crate::error::Result;
use crate::providers::Providers;

const DEVICE_BINDINGS_COLLECTION: &str = "users";
const NOTIFICATION_TITLE: &str = "Your updates are available";
const NOTIFICATION_BODY: &str = "Fresh news articles and podcast are ready!";

/// Notifier (spec §4.7): sends a push to a user's registered device. Never
/// fails the pipeline — an unknown or unauthorized token is logged and
/// swallowed, not propagated.
pub struct Notifier {
    providers: Providers,
    store: Arc<DocStore>,
}

impl Notifier {
    pub fn new(providers: Providers, store: Arc<DocStore>) -> Self {
        Self { providers, store }
    }

    pub async fn notify(&self, user_id: &str) -> Result<Option<PushOutcome>> {
        let binding: Option<DeviceBinding> = self.store.get(DEVICE_BINDINGS_COLLECTION, user_id)?;
        let Some(binding) = binding else {
            warn!(user_id, "no device binding on file, skipping push");
            return Ok(None);
        };

        let opts = PlatformOpts {
            high_priority: true,
            default_sound: true,
            badge: Some(1),
        };

        match self
            .providers
            .push
            .send(&binding.fcm_token, NOTIFICATION_TITLE, NOTIFICATION_BODY, &opts)
            .await
        {
            Ok(outcome) => {
                info!(user_id, message_id = outcome.message_id, "push sent");
                Ok(Some(outcome))
            }
            Err(ProviderError::PushUnknownToken(msg)) => {
                warn!(user_id, msg, "push token unknown, continuing without push");
                Ok(None)
            }
            Err(ProviderError::PushUnauthorized(msg)) => {
                warn!(user_id, msg, "push unauthorized, continuing without push");
                Ok(None)
            }
            Err(e) => {
                warn!(user_id, error = %e, "push failed, continuing without push");
                Ok(None)
            }
        }
    }
}
