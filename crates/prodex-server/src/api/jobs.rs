//! Asynchronous scrape jobs: enqueue and poll.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CreateJobRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct JobItem {
    id: Uuid,
    vendor_url: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    attempts: i32,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl From<prodex_db::ScrapeJobRow> for JobItem {
    fn from(row: prodex_db::ScrapeJobRow) -> Self {
        Self {
            id: row.id,
            vendor_url: row.vendor_url,
            status: row.status,
            result: row.result,
            error_message: row.error_message,
            attempts: row.attempts,
            created_at: row.created_at,
            started_at: row.started_at,
            finished_at: row.finished_at,
        }
    }
}

pub(super) async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobItem>), ApiError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::new("bad_request", "url must not be empty"));
    }
    if let Err(err) = state.scraper.classify_url(url) {
        return Err(ApiError::new("bad_request", err.to_string()));
    }

    let row = prodex_db::enqueue_job(&state.pool, url)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok((StatusCode::ACCEPTED, Json(row.into())))
}

pub(super) async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobItem>, ApiError> {
    match prodex_db::get_job(&state.pool, id).await {
        Ok(row) => Ok(Json(row.into())),
        Err(prodex_db::DbError::JobNotFound(_)) => {
            Err(ApiError::new("not_found", format!("no job with id {id}")))
        }
        Err(e) => Err(map_db_error(&e)),
    }
}
