use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Provider(#[from] prysm_providers::ProviderError),

    #[error(transparent)]
    Preferences(#[from] prysm_preferences::PreferencesError),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
