//! Database operations for the `scrape_jobs` queue.
//!
//! The queue is a single Postgres table worked by competing pollers. Claiming
//! uses `FOR UPDATE SKIP LOCKED` inside one statement, so two workers can
//! never take the same job and a crashed worker's claim expires via the
//! janitor's stuck-job reset rather than a lock.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const JOB_COLUMNS: &str = "id, vendor_url, status, result, error_message, attempts, \
                           created_at, started_at, finished_at";

/// A row from the `scrape_jobs` table.
///
/// `status` is one of `queued`, `processing`, `completed`, `failed`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeJobRow {
    pub id: Uuid,
    pub vendor_url: String,
    pub status: String,
    /// Response envelope JSON, set when the job completes.
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Creates a new scrape job in `queued` status and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn enqueue_job(pool: &PgPool, vendor_url: &str) -> Result<ScrapeJobRow, DbError> {
    let row = sqlx::query_as::<_, ScrapeJobRow>(&format!(
        "INSERT INTO scrape_jobs (id, vendor_url, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {JOB_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(vendor_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a job by id.
///
/// # Errors
///
/// Returns [`DbError::JobNotFound`] when no row matches, [`DbError::Sqlx`]
/// on query failure.
pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<ScrapeJobRow, DbError> {
    sqlx::query_as::<_, ScrapeJobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM scrape_jobs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::JobNotFound(id))
}

/// Atomically claims the oldest queued job, marking it `processing` and
/// bumping `attempts`. Returns `None` when the queue is empty. Safe under
/// concurrent pollers: `FOR UPDATE SKIP LOCKED` prevents double claims.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the claim statement fails.
pub async fn claim_next_job(pool: &PgPool) -> Result<Option<ScrapeJobRow>, DbError> {
    let row = sqlx::query_as::<_, ScrapeJobRow>(&format!(
        "UPDATE scrape_jobs SET status = 'processing', started_at = NOW(), \
                attempts = attempts + 1 \
         WHERE id = ( \
             SELECT id FROM scrape_jobs WHERE status = 'queued' \
             ORDER BY created_at \
             LIMIT 1 \
             FOR UPDATE SKIP LOCKED \
         ) \
         RETURNING {JOB_COLUMNS}"
    ))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Marks a processing job as `completed` and stores the result envelope.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobTransition`] when the job is not in
/// `processing`, [`DbError::Sqlx`] on query failure.
pub async fn complete_job(pool: &PgPool, id: Uuid, result: &Value) -> Result<(), DbError> {
    let outcome = sqlx::query(
        "UPDATE scrape_jobs \
         SET status = 'completed', result = $1, finished_at = NOW() \
         WHERE id = $2 AND status = 'processing'",
    )
    .bind(result)
    .bind(id)
    .execute(pool)
    .await?;

    if outcome.rows_affected() == 0 {
        return Err(DbError::InvalidJobTransition {
            id,
            expected_status: "processing",
        });
    }

    Ok(())
}

/// Marks a processing job as `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobTransition`] when the job is not in
/// `processing`, [`DbError::Sqlx`] on query failure.
pub async fn fail_job(pool: &PgPool, id: Uuid, error_message: &str) -> Result<(), DbError> {
    let outcome = sqlx::query(
        "UPDATE scrape_jobs \
         SET status = 'failed', error_message = $1, finished_at = NOW() \
         WHERE id = $2 AND status = 'processing'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if outcome.rows_affected() == 0 {
        return Err(DbError::InvalidJobTransition {
            id,
            expected_status: "processing",
        });
    }

    Ok(())
}

/// Returns jobs stuck in `processing` longer than `stuck_after_secs` to the
/// queue. Recovers work orphaned by a crashed or restarted worker. Returns
/// the number of jobs reset.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
#[allow(clippy::cast_precision_loss)]
pub async fn reset_stuck_jobs(pool: &PgPool, stuck_after_secs: u64) -> Result<u64, DbError> {
    let outcome = sqlx::query(
        "UPDATE scrape_jobs \
         SET status = 'queued', started_at = NULL \
         WHERE status = 'processing' \
           AND started_at < NOW() - make_interval(secs => $1)",
    )
    .bind(stuck_after_secs as f64)
    .execute(pool)
    .await?;

    Ok(outcome.rows_affected())
}

/// Deletes completed and failed jobs older than `retention_days`. Returns the
/// number of jobs purged.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn purge_finished_jobs(pool: &PgPool, retention_days: u32) -> Result<u64, DbError> {
    let outcome = sqlx::query(
        "DELETE FROM scrape_jobs \
         WHERE status IN ('completed', 'failed') \
           AND finished_at < NOW() - make_interval(days => $1)",
    )
    .bind(i32::try_from(retention_days).unwrap_or(i32::MAX))
    .execute(pool)
    .await?;

    Ok(outcome.rows_affected())
}
