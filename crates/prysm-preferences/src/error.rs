use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("invalid preferences shape: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Store(#[from] prysm_store::StoreError),
}

impl PreferencesError {
    pub fn status_code(&self) -> u16 {
        match self {
            PreferencesError::InvalidSchema(_) => 400,
            PreferencesError::Store(prysm_store::StoreError::NotFound { .. }) => 404,
            PreferencesError::Store(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, PreferencesError>;
