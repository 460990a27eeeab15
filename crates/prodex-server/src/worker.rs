//! Job-queue worker: one poll loop per server process.
//!
//! The claim statement is concurrency-safe, so running multiple server
//! instances against the same database just divides the queue between them.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use prodex_scraper::ProductScraper;

/// Polls the queue forever. Claims one job per iteration, scrapes it, and
/// writes the outcome back. Database errors are logged and the loop keeps
/// going; a dead database should not kill the worker task.
pub async fn run(pool: PgPool, scraper: Arc<ProductScraper>, poll_interval_ms: u64) {
    let idle = Duration::from_millis(poll_interval_ms);
    tracing::info!(poll_interval_ms, "job worker started");

    loop {
        match prodex_db::claim_next_job(&pool).await {
            Ok(Some(job)) => {
                process_job(&pool, &scraper, job).await;
            }
            Ok(None) => {
                tokio::time::sleep(idle).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "worker failed to claim a job");
                tokio::time::sleep(idle).await;
            }
        }
    }
}

async fn process_job(pool: &PgPool, scraper: &ProductScraper, job: prodex_db::ScrapeJobRow) {
    tracing::info!(job_id = %job.id, url = %job.vendor_url, attempt = job.attempts, "processing job");

    let outcome = scraper.scrape(&job.vendor_url).await;
    let write_result = if outcome.success {
        match serde_json::to_value(&outcome) {
            Ok(envelope) => prodex_db::complete_job(pool, job.id, &envelope).await,
            Err(e) => {
                prodex_db::fail_job(pool, job.id, &format!("result serialization failed: {e}"))
                    .await
            }
        }
    } else {
        let message = outcome
            .error
            .as_deref()
            .unwrap_or("scrape produced no usable product data");
        prodex_db::fail_job(pool, job.id, message).await
    };

    if let Err(e) = write_result {
        tracing::error!(job_id = %job.id, error = %e, "failed to record job outcome");
    }
}
