use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sites_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Overall budget for a single plain-HTTP fetch.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Optional forward proxy for outbound fetches. Credentials, if any, are
    /// embedded in the URL.
    pub proxy_url: Option<String>,
    /// Additional attempts after the first failure for transient fetch errors.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Feature flag for the headless-browser fetch fallback.
    pub browser_enabled: bool,
    /// Explicit browser executable path; auto-detected when absent.
    pub browser_executable: Option<PathBuf>,
    pub page_load_timeout_secs: u64,
    /// Budget for waiting on a named selector in browser mode. A miss is
    /// non-fatal; extraction continues with whatever the page has rendered.
    pub selector_wait_timeout_secs: u64,
    pub job_stuck_after_secs: u64,
    pub job_retention_days: u32,
    pub worker_poll_interval_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sites_path", &self.sites_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("proxy_url", &self.proxy_url.as_ref().map(|_| "[redacted]"))
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("browser_enabled", &self.browser_enabled)
            .field("browser_executable", &self.browser_executable)
            .field("page_load_timeout_secs", &self.page_load_timeout_secs)
            .field(
                "selector_wait_timeout_secs",
                &self.selector_wait_timeout_secs,
            )
            .field("job_stuck_after_secs", &self.job_stuck_after_secs)
            .field("job_retention_days", &self.job_retention_days)
            .field("worker_poll_interval_ms", &self.worker_poll_interval_ms)
            .finish()
    }
}
