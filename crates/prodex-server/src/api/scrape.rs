//! Synchronous scrape endpoint.
//!
//! Status codes carry transport meaning only: 400 for malformed input, 200
//! for any scrape that ran (including `success: false` soft failures), 500
//! for faults inside the server itself. The envelope's `success` flag is the
//! real outcome signal.

use axum::{extract::State, Json};
use serde::Deserialize;

use prodex_scraper::ScrapeOutcome;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRequest {
    pub url: String,
}

pub(super) async fn scrape_product(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeOutcome>, ApiError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::new("bad_request", "url must not be empty"));
    }
    if let Err(err) = state.scraper.classify_url(url) {
        return Err(ApiError::new("bad_request", err.to_string()));
    }

    Ok(Json(state.scraper.scrape(url).await))
}
