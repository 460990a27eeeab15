use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;
use crate::fetch::detect_block;
use crate::fetch::retry::retry_with_backoff;

/// Settings for [`FetchClient`], usually derived from the app config.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub proxy_url: Option<String>,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: "prodex/0.1 (product-extraction)".to_owned(),
            proxy_url: None,
            max_retries: 1,
            backoff_base_ms: 500,
        }
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// URL after any auto-followed redirects.
    pub final_url: String,
}

/// One step of a manually-followed redirect chain.
#[derive(Debug, Clone)]
pub struct RedirectStep {
    pub status: u16,
    /// Raw `Location` header value, possibly relative.
    pub location: Option<String>,
}

/// HTTP fetch strategy: one-shot GET with timeout, optional proxy, bounded
/// transient-error retry, and bot-block detection.
///
/// Carries two underlying clients: the default one auto-follows redirects
/// (capped at 5 hops), and a bare one that never follows, used by the
/// redirect resolver to inspect `Location` headers hop by hop.
pub struct FetchClient {
    client: Client,
    /// Redirect-following disabled; the resolver reads `Location` manually.
    bare: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl FetchClient {
    /// Creates a `FetchClient` with configured timeout, `User-Agent`, proxy,
    /// and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Network`] if a client cannot be constructed
    /// (e.g. an invalid proxy URL).
    pub fn new(config: &FetchConfig) -> Result<Self, ScrapeError> {
        let build = |follow_redirects: bool| -> Result<Client, ScrapeError> {
            let mut builder = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .user_agent(&config.user_agent);

            builder = if follow_redirects {
                builder.redirect(reqwest::redirect::Policy::limited(5))
            } else {
                builder.redirect(reqwest::redirect::Policy::none())
            };

            if let Some(proxy_url) = &config.proxy_url {
                let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| ScrapeError::Network {
                    url: "proxy configuration".to_owned(),
                    source: e,
                })?;
                builder = builder.proxy(proxy);
            }

            builder.build().map_err(|e| ScrapeError::Network {
                url: "client construction".to_owned(),
                source: e,
            })
        };

        Ok(Self {
            client: build(true)?,
            bare: build(false)?,
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// Fetches a page body, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Blocked`] — 403/429 or a bot-protection signature in
    ///   the body (not retried).
    /// - [`ScrapeError::Timeout`] / [`ScrapeError::Network`] — after retries
    ///   are exhausted.
    /// - [`ScrapeError::UnexpectedStatus`] — any other non-2xx status.
    pub async fn get_html(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8")
                .send()
                .await
                .map_err(|e| ScrapeError::from_reqwest(url, e))?;

            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let body = response
                .text()
                .await
                .map_err(|e| ScrapeError::from_reqwest(url, e))?;

            if let Some(marker) = detect_block(status, &body) {
                return Err(ScrapeError::Blocked {
                    url: url.to_owned(),
                    marker,
                });
            }

            if !(200..300).contains(&status) {
                return Err(ScrapeError::UnexpectedStatus {
                    status,
                    url: url.to_owned(),
                });
            }

            Ok(FetchedPage {
                status,
                body,
                final_url,
            })
        })
        .await
    }

    /// Issues a single GET without following redirects and reports the status
    /// plus the raw `Location` header. Used by the redirect resolver, which
    /// owns the hop loop and its termination policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Timeout`] or [`ScrapeError::Network`] on
    /// connection-level failure. Any HTTP status, including errors, is a
    /// successful observation for the resolver.
    pub async fn get_no_redirect(&self, url: &str) -> Result<RedirectStep, ScrapeError> {
        let response = self
            .bare
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(RedirectStep { status, location })
    }
}
