//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the two
//! queue-janitor jobs: returning stale `processing` rows to the queue and
//! purging finished rows past retention.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<prodex_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_stuck_job_sweep(&scheduler, pool.clone(), Arc::clone(&config)).await?;
    register_retention_sweep(&scheduler, pool, config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the stuck-job sweep, every minute.
///
/// A job left in `processing` longer than `job_stuck_after_secs` belongs to
/// a worker that crashed or was restarted mid-scrape; the sweep returns it
/// to `queued` for another attempt.
async fn register_stuck_job_sweep(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<prodex_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let stuck_after_secs = config.job_stuck_after_secs;

        Box::pin(async move {
            match prodex_db::reset_stuck_jobs(&pool, stuck_after_secs).await {
                Ok(0) => {}
                Ok(reset) => {
                    tracing::warn!(reset, stuck_after_secs, "scheduler: reset stuck scrape jobs");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: stuck-job sweep failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Register the retention sweep, daily at 03:10 UTC.
async fn register_retention_sweep(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<prodex_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 10 3 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let retention_days = config.job_retention_days;

        Box::pin(async move {
            match prodex_db::purge_finished_jobs(&pool, retention_days).await {
                Ok(purged) => {
                    tracing::info!(purged, retention_days, "scheduler: purged finished scrape jobs");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: retention sweep failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
