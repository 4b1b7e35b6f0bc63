use thiserror::Error;

/// Errors shared across every Prysm crate that aren't specific to one
/// external collaborator (those get their own error enum — see
/// `prysm-providers::provider::ProviderError`, `prysm-scheduler::error`, etc).
#[derive(Debug, Error)]
pub enum PrysmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PrysmError {
    /// Short error code, mirrored in HTTP error responses (§6).
    pub fn code(&self) -> &'static str {
        match self {
            PrysmError::Config(_) => "CONFIG_ERROR",
            PrysmError::Database(_) => "DATABASE_ERROR",
            PrysmError::Io(_) => "IO_ERROR",
            PrysmError::Serialization(_) => "SERIALIZATION_ERROR",
            PrysmError::InvalidInput(_) => "INVALID_INPUT",
            PrysmError::NotFound(_) => "NOT_FOUND",
            PrysmError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the gateway should map this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            PrysmError::InvalidInput(_) => 400,
            PrysmError::NotFound(_) => 404,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrysmError>;
