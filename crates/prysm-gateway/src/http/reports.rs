use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use prysm_core::types::{UserArticlesBundle, UserReportBundle};
use serde::Deserialize;

use crate::app::AppState;
use crate::http::{ok, ApiError, ApiResult};

const ARTICLES_COLLECTION: &str = "articles";
const REPORTS_COLLECTION: &str = "aifeed";

#[derive(Deserialize)]
pub struct UserIdRequest {
    pub user_id: String,
}

/// POST /get_complete_report_endpoint — runs the Report Builder over the
/// user's most recently fetched article bundle and persists `aifeed/{user_id}`
/// (spec §4.4, §6). 404 if no article bundle has been fetched yet.
pub async fn get_complete_report_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserIdRequest>,
) -> ApiResult<UserReportBundle> {
    let bundle: Option<UserArticlesBundle> = state.store.get(ARTICLES_COLLECTION, &req.user_id)?;
    let bundle = bundle.ok_or_else(|| ApiError::not_found(format!("no articles for user {}", req.user_id)))?;

    let report = state.reports.complete_user_report(&bundle).await?;
    Ok(ok(report))
}

/// POST /get_aifeed_reports_endpoint — read-only fetch of the persisted
/// report bundle; 404 when absent (spec §6).
pub async fn get_aifeed_reports_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserIdRequest>,
) -> ApiResult<UserReportBundle> {
    let report: Option<UserReportBundle> = state.store.get(REPORTS_COLLECTION, &req.user_id)?;
    let report = report.ok_or_else(|| ApiError::not_found(format!("no report for user {}", req.user_id)))?;
    Ok(ok(report))
}
