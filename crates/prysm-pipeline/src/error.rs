use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Provider(#[from] prysm_providers::ProviderError),

    #[error(transparent)]
    Store(#[from] prysm_store::StoreError),

    #[error(transparent)]
    Preferences(#[from] prysm_preferences::PreferencesError),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
