use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Store(#[from] prysm_store::StoreError),

    #[error(transparent)]
    Preferences(#[from] prysm_preferences::PreferencesError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
