use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("PRODEX_ENV", "development"));

    let bind_addr = parse_addr("PRODEX_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PRODEX_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("PRODEX_SITES_PATH", "./config/sites.yaml"));

    let db_max_connections = parse_u32("PRODEX_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRODEX_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PRODEX_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("PRODEX_FETCH_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("PRODEX_USER_AGENT", "prodex/0.1 (product-extraction)");
    let proxy_url = lookup("PRODEX_PROXY_URL").ok();
    let max_retries = parse_u32("PRODEX_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("PRODEX_RETRY_BACKOFF_BASE_MS", "500")?;

    let browser_enabled = parse_bool("PRODEX_BROWSER_ENABLED", "false")?;
    let browser_executable = lookup("PRODEX_BROWSER_EXECUTABLE").ok().map(PathBuf::from);
    let page_load_timeout_secs = parse_u64("PRODEX_PAGE_LOAD_TIMEOUT_SECS", "45")?;
    let selector_wait_timeout_secs = parse_u64("PRODEX_SELECTOR_WAIT_TIMEOUT_SECS", "10")?;

    let job_stuck_after_secs = parse_u64("PRODEX_JOB_STUCK_AFTER_SECS", "600")?;
    let job_retention_days = parse_u32("PRODEX_JOB_RETENTION_DAYS", "14")?;
    let worker_poll_interval_ms = parse_u64("PRODEX_WORKER_POLL_INTERVAL_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        sites_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        user_agent,
        proxy_url,
        max_retries,
        retry_backoff_base_ms,
        browser_enabled,
        browser_executable,
        page_load_timeout_secs,
        selector_wait_timeout_secs,
        job_stuck_after_secs,
        job_retention_days,
        worker_poll_interval_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
