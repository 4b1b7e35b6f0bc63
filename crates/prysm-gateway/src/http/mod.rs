pub mod articles;
pub mod discovery;
pub mod health;
pub mod podcast;
pub mod preferences;
pub mod reports;
pub mod update;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Every response is JSON with an explicit `success` boolean plus either
/// the result fields (flattened alongside `success`) or an `error` string
/// and a `timestamp` (spec §6).
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { success: true, data })
}

#[derive(Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub error: String,
    pub timestamp: chrono::DateTime<Utc>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            error: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl From<prysm_preferences::PreferencesError> for ApiError {
    fn from(e: prysm_preferences::PreferencesError) -> Self {
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError::new(status, e.to_string())
    }
}

impl From<prysm_store::StoreError> for ApiError {
    fn from(e: prysm_store::StoreError) -> Self {
        let status = match &e {
            prysm_store::StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, e.to_string())
    }
}

impl From<prysm_pipeline::PipelineError> for ApiError {
    fn from(e: prysm_pipeline::PipelineError) -> Self {
        ApiError::internal(e.to_string())
    }
}

impl From<prysm_discovery::DiscoveryError> for ApiError {
    fn from(e: prysm_discovery::DiscoveryError) -> Self {
        ApiError::internal(e.to_string())
    }
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        count: u32,
    }

    #[test]
    fn envelope_flattens_alongside_success() {
        let value = serde_json::to_value(Envelope { success: true, data: Payload { count: 3 } }).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 3);
    }
}
