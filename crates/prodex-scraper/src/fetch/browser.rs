//! Headless-browser fetch strategy for client-rendered product pages.
//!
//! Each render launches an isolated browser context, navigates with a
//! content-load wait, optionally waits (bounded, non-fatal) for a named
//! selector to appear, captures the rendered HTML, and tears the browser
//! down on every exit path — success, error, or timeout. The teardown is
//! funneled through a single cleanup point so no branch can leak a browser
//! process.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig as ChromeLaunchConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::ScrapeError;
use crate::fetch::detect_block;

/// Settings for [`BrowserFetcher`], usually derived from the app config.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Explicit browser executable; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    /// Overall budget for navigation plus render capture.
    pub page_load_timeout_secs: u64,
    /// Budget for the optional selector wait. A miss degrades gracefully.
    pub selector_wait_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            page_load_timeout_secs: 45,
            selector_wait_timeout_secs: 10,
        }
    }
}

/// One launched browser process. The seam between [`capture`] and the real
/// CDP connection: render/teardown ordering stays verifiable without
/// launching a browser.
pub(crate) trait BrowserSession {
    async fn render_page(
        &mut self,
        url: &str,
        wait_selector: Option<&str>,
        selector_wait_timeout_secs: u64,
    ) -> Result<String, ScrapeError>;

    /// Releases the browser process. Called exactly once per render.
    async fn shutdown(&mut self);
}

/// Browser-mode fetcher. Holds only configuration; a fresh browser process is
/// launched per render and always released.
pub struct BrowserFetcher {
    config: BrowserConfig,
}

impl BrowserFetcher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Renders `url` in a headless browser and returns the resulting HTML.
    ///
    /// When `wait_selector` is given, the render waits (bounded by
    /// `selector_wait_timeout_secs`) for that selector to appear before
    /// capturing content; a wait timeout is non-fatal and capture proceeds
    /// with whatever has rendered.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Browser`] — launch or CDP failure.
    /// - [`ScrapeError::Timeout`] — page-load budget exhausted.
    /// - [`ScrapeError::Blocked`] — the rendered page is a bot-protection wall.
    pub async fn render(&self, url: &str, wait_selector: Option<&str>) -> Result<String, ScrapeError> {
        let session = ChromeSession::launch(&self.config).await?;
        capture(session, url, wait_selector, &self.config).await
    }
}

/// Drives a session through navigate-wait-capture under the page-load budget.
/// Every exit path above the shutdown call flows through it: the session is
/// released exactly once whether the render succeeded, errored, or timed out.
async fn capture<S: BrowserSession>(
    mut session: S,
    url: &str,
    wait_selector: Option<&str>,
    config: &BrowserConfig,
) -> Result<String, ScrapeError> {
    let budget = Duration::from_secs(config.page_load_timeout_secs);
    let result = match tokio::time::timeout(
        budget,
        session.render_page(url, wait_selector, config.selector_wait_timeout_secs),
    )
    .await
    {
        Ok(inner) => inner,
        Err(_elapsed) => Err(ScrapeError::Timeout {
            url: url.to_owned(),
        }),
    };

    // Single teardown point for every exit path above.
    session.shutdown().await;

    let html = result?;
    if let Some(marker) = detect_block(200, &html) {
        return Err(ScrapeError::Blocked {
            url: url.to_owned(),
            marker,
        });
    }
    Ok(html)
}

/// The real session: a chromiumoxide browser plus the task driving its CDP
/// event stream.
struct ChromeSession {
    browser: Browser,
    driver: JoinHandle<()>,
}

impl ChromeSession {
    async fn launch(config: &BrowserConfig) -> Result<Self, ScrapeError> {
        let mut builder = ChromeLaunchConfig::builder();
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        let launch_config = builder
            .build()
            .map_err(|message| ScrapeError::Browser { message })?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| ScrapeError::Browser {
                message: e.to_string(),
            })?;

        // The handler stream must be driven for the CDP connection to make
        // progress; it ends on its own once the browser closes.
        let driver = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, driver })
    }
}

impl BrowserSession for ChromeSession {
    async fn render_page(
        &mut self,
        url: &str,
        wait_selector: Option<&str>,
        selector_wait_timeout_secs: u64,
    ) -> Result<String, ScrapeError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScrapeError::Browser {
                message: e.to_string(),
            })?;

        if let Err(e) = page.wait_for_navigation().await {
            tracing::debug!(url, error = %e, "wait_for_navigation failed; reading current content");
        }

        if let Some(selector) = wait_selector {
            wait_for_selector(&page, selector, selector_wait_timeout_secs).await;
        }

        page.content().await.map_err(|e| ScrapeError::Browser {
            message: e.to_string(),
        })
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "failed to close headless browser cleanly");
        }
        let _ = self.browser.wait().await;
        self.driver.abort();
    }
}

/// Polls for `selector` until it appears or the budget elapses. A miss is
/// logged and extraction continues without that data.
async fn wait_for_selector(page: &chromiumoxide::Page, selector: &str, timeout_secs: u64) {
    let poll = async {
        loop {
            if page.find_element(selector).await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(timeout_secs), poll)
        .await
        .is_err()
    {
        tracing::debug!(selector, timeout_secs, "selector wait timed out; continuing");
    }
}
