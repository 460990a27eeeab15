//! Request orchestration: classify, resolve, fetch, extract, normalize.
//!
//! Failure containment lives here. Extractors report recoverable problems as
//! degraded [`RawProduct`] records; fetch-level errors propagate as
//! [`ScrapeError`] until they reach [`ProductScraper::scrape`], which is the
//! single point that converts them into a `success: false` envelope. Nothing
//! above this module sees a panic or a raw error for a scrape request.

use std::sync::Arc;

use tracing::{debug, info, warn};

use prodex_core::{AppConfig, CategoryDetect, KeywordCategoryDetector, SiteDescriptor};

use crate::classify::{classify, Handler, SiteTable};
use crate::envelope::ScrapeOutcome;
use crate::error::ScrapeError;
use crate::extract;
use crate::fetch::{BrowserConfig, BrowserFetcher, FetchClient, FetchConfig};
use crate::normalize::{normalize, SiteDefaults};
use crate::redirect::{resolve_redirects, AbortReason, RedirectOutcome};
use crate::types::{NormalizedProduct, RawProduct};

/// How many redirect-platform resolutions a single request may chain through.
/// A resolved short link that lands on another shortener is almost always a
/// dead or malicious link.
const MAX_RESOLUTION_DEPTH: u32 = 1;

/// The scrape pipeline entry point. One instance is shared across the server;
/// all methods take `&self`.
pub struct ProductScraper {
    http: FetchClient,
    browser: Option<BrowserFetcher>,
    table: SiteTable,
    detector: Arc<dyn CategoryDetect + Send + Sync>,
}

impl ProductScraper {
    pub fn new(
        http: FetchClient,
        browser: Option<BrowserFetcher>,
        table: SiteTable,
        detector: Arc<dyn CategoryDetect + Send + Sync>,
    ) -> Self {
        Self {
            http,
            browser,
            table,
            detector,
        }
    }

    /// Builds a fully-wired scraper from application config, loading the site
    /// descriptor file from `config.sites_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] when the descriptor file is missing or
    /// invalid, [`ScrapeError::Network`] when the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        let sites = prodex_core::load_sites(&config.sites_path)?;
        let table = SiteTable::from_sites_file(sites);

        let http = FetchClient::new(&FetchConfig {
            timeout_secs: config.fetch_timeout_secs,
            user_agent: config.user_agent.clone(),
            proxy_url: config.proxy_url.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })?;

        let browser = config.browser_enabled.then(|| {
            BrowserFetcher::new(BrowserConfig {
                executable: config.browser_executable.clone(),
                page_load_timeout_secs: config.page_load_timeout_secs,
                selector_wait_timeout_secs: config.selector_wait_timeout_secs,
            })
        });

        Ok(Self::new(
            http,
            browser,
            table,
            Arc::new(KeywordCategoryDetector::default()),
        ))
    }

    /// Scrapes a product URL into a response envelope. Never returns an
    /// error: pipeline failures become `success: false` envelopes here.
    pub async fn scrape(&self, url: &str) -> ScrapeOutcome {
        match self.scrape_product(url).await {
            Ok(product) => ScrapeOutcome::from_product(&product),
            Err(err) => {
                warn!(url, error = %err, "scrape failed");
                ScrapeOutcome::from_error(err.to_string())
            }
        }
    }

    /// Scrapes a product URL into the canonical record.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] for hard failures only: malformed URLs and
    /// fetch errors that survived retry. Degraded extractions come back as
    /// `Ok` records carrying `error`/`blocked` flags.
    pub async fn scrape_product(&self, url: &str) -> Result<NormalizedProduct, ScrapeError> {
        self.scrape_inner(url, url, 0).await
    }

    /// Classifies a URL against the site table without fetching anything.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidUrl`] for unparsable input.
    pub fn classify_url(&self, url: &str) -> Result<Handler, ScrapeError> {
        classify(url, &self.table)
    }

    /// Follows a short link's redirect chain without scraping the target.
    pub async fn resolve_url(&self, url: &str) -> RedirectOutcome {
        resolve_redirects(&self.http, &self.table, url).await
    }

    async fn scrape_inner(
        &self,
        url: &str,
        requested_url: &str,
        depth: u32,
    ) -> Result<NormalizedProduct, ScrapeError> {
        let handler = classify(url, &self.table)?;
        info!(url, handler = handler.id(), depth, "dispatching scrape");

        match handler {
            Handler::Redirect => self.handle_redirect(url, requested_url, depth).await,
            Handler::Site(descriptor) => {
                let raw = self.scrape_site(url, &descriptor).await?;
                let defaults = SiteDefaults {
                    brand_fallback: descriptor.brand_fallback.clone(),
                    category_hint: descriptor.category_hint.clone(),
                };
                Ok(normalize(raw, requested_url, &defaults, &*self.detector))
            }
            Handler::Shopify => {
                let raw = self.scrape_shopify(url).await?;
                Ok(normalize(
                    raw,
                    requested_url,
                    &SiteDefaults::default(),
                    &*self.detector,
                ))
            }
            Handler::Generic => {
                let raw = self.scrape_generic(url).await?;
                Ok(normalize(
                    raw,
                    requested_url,
                    &SiteDefaults::default(),
                    &*self.detector,
                ))
            }
        }
    }

    async fn handle_redirect(
        &self,
        url: &str,
        requested_url: &str,
        depth: u32,
    ) -> Result<NormalizedProduct, ScrapeError> {
        if depth >= MAX_RESOLUTION_DEPTH {
            debug!(url, depth, "resolution depth exhausted");
            let raw = RawProduct::soft_failure(url, "short link resolved to another short link");
            return Ok(normalize(
                raw,
                requested_url,
                &SiteDefaults::default(),
                &*self.detector,
            ));
        }

        let outcome = resolve_redirects(&self.http, &self.table, url).await;
        match &outcome {
            RedirectOutcome::Resolved { url: target, hops } => {
                info!(url, target, hops, "short link resolved");
            }
            RedirectOutcome::Aborted {
                last_url,
                hops,
                reason,
            } => {
                debug!(url, last_url, hops, ?reason, "redirect resolution aborted");
                if *reason == AbortReason::StuckOnRedirectPlatform {
                    let raw =
                        RawProduct::soft_failure(url, "short link is dead or could not be expanded");
                    return Ok(normalize(
                        raw,
                        requested_url,
                        &SiteDefaults::default(),
                        &*self.detector,
                    ));
                }
            }
        }

        // Aborted chains still carry the furthest URL reached; scrape that.
        let target = outcome.url().to_owned();
        Box::pin(self.scrape_inner(&target, requested_url, depth + 1)).await
    }

    async fn scrape_site(
        &self,
        url: &str,
        descriptor: &SiteDescriptor,
    ) -> Result<RawProduct, ScrapeError> {
        let wait_selector = descriptor.selectors.name.first().map(String::as_str);

        let html = if descriptor.requires_browser && self.browser.is_some() {
            self.render_in_browser(url, wait_selector).await
        } else {
            self.http.get_html(url).await.map(|page| page.body)
        };

        let html = match html {
            Ok(html) => html,
            Err(ScrapeError::Blocked { marker, .. }) => {
                // Plain HTTP hit a bot wall; a real browser sometimes passes.
                if !descriptor.requires_browser && self.browser.is_some() {
                    match self.render_in_browser(url, wait_selector).await {
                        Ok(html) => html,
                        Err(err) => return Ok(self.salvage_blocked(url, &err, &marker)),
                    }
                } else {
                    return Ok(RawProduct::blocked(
                        url,
                        &marker,
                        extract::title_from_slug(url),
                    ));
                }
            }
            Err(err) => return Err(err),
        };

        Ok(extract::extract_from_html(&html, url, &descriptor.selectors))
    }

    async fn scrape_shopify(&self, url: &str) -> Result<RawProduct, ScrapeError> {
        if let Some(json_url) = extract::shopify::product_json_url(url) {
            match extract::shopify::extract_product_json(&self.http, url, &json_url).await {
                Ok(raw) => return Ok(raw),
                Err(err) => {
                    debug!(url, error = %err, "product json endpoint failed; using page extraction");
                }
            }
        }

        self.scrape_with_generic_selectors(url).await
    }

    async fn scrape_generic(&self, url: &str) -> Result<RawProduct, ScrapeError> {
        let page = match self.http.get_html(url).await {
            Ok(page) => page,
            Err(ScrapeError::Blocked { marker, .. }) => {
                return Ok(RawProduct::blocked(
                    url,
                    &marker,
                    extract::title_from_slug(url),
                ));
            }
            Err(err) => return Err(err),
        };

        // Unrecognized hosts are often Shopify storefronts; their JSON
        // endpoint beats heuristic DOM scraping when it answers.
        if extract::looks_like_shopify(&page.body) {
            if let Some(json_url) = extract::shopify::product_json_url(url) {
                match extract::shopify::extract_product_json(&self.http, url, &json_url).await {
                    Ok(raw) => return Ok(raw),
                    Err(err) => {
                        debug!(url, error = %err, "shopify signature matched but json endpoint failed");
                    }
                }
            }
        }

        Ok(extract::extract_from_html(
            &page.body,
            url,
            &extract::generic::generic_selectors(),
        ))
    }

    async fn scrape_with_generic_selectors(&self, url: &str) -> Result<RawProduct, ScrapeError> {
        let page = match self.http.get_html(url).await {
            Ok(page) => page,
            Err(ScrapeError::Blocked { marker, .. }) => {
                return Ok(RawProduct::blocked(
                    url,
                    &marker,
                    extract::title_from_slug(url),
                ));
            }
            Err(err) => return Err(err),
        };
        Ok(extract::extract_from_html(
            &page.body,
            url,
            &extract::generic::generic_selectors(),
        ))
    }

    async fn render_in_browser(
        &self,
        url: &str,
        wait_selector: Option<&str>,
    ) -> Result<String, ScrapeError> {
        match &self.browser {
            Some(browser) => browser.render(url, wait_selector).await,
            None => Err(ScrapeError::BrowserDisabled),
        }
    }

    fn salvage_blocked(&self, url: &str, err: &ScrapeError, http_marker: &str) -> RawProduct {
        let marker = match err {
            ScrapeError::Blocked { marker, .. } => marker.as_str(),
            _ => http_marker,
        };
        debug!(url, marker, "blocked on both http and browser paths");
        RawProduct::blocked(url, marker, extract::title_from_slug(url))
    }
}
