use thiserror::Error;

/// Errors the extraction pipeline can raise.
///
/// Only conditions the caller cannot act on surface as errors; anything an
/// extractor can degrade around (bot blocks, missing fields, unparsable
/// structured data) is carried as a soft-failure value on
/// [`crate::types::RawProduct`] instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("blocked by {url} ({marker})")]
    Blocked { url: String, marker: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("headless browser failure: {message}")]
    Browser { message: String },

    #[error("browser-mode fetch requested but disabled by configuration")]
    BrowserDisabled,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] prodex_core::ConfigError),
}

impl ScrapeError {
    /// Maps a `reqwest` failure to the right variant, distinguishing timeouts
    /// from other network-level failures.
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_owned(),
            }
        } else {
            ScrapeError::Network {
                url: url.to_owned(),
                source: err,
            }
        }
    }

    /// Whether a fetch carrying this error may still succeed on retry.
    ///
    /// Blocks and client errors are not transient: retrying a 403 from the
    /// same address returns the same 403.
    pub(crate) fn is_transient(&self) -> bool {
        matches!(
            self,
            ScrapeError::Network { .. } | ScrapeError::Timeout { .. }
        )
    }
}
