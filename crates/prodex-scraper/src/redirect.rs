//! Short-link resolution.
//!
//! Affiliate and link-shortener URLs (bit.ly, shopmy.us, liketk.it, ...)
//! hide the retailer behind a redirect chain. The resolver follows that
//! chain manually, one hop at a time, so it can detect loops, enforce a hop
//! ceiling, and recognise when a chain dead-ends on the redirect platform
//! itself. Resolution never hard-fails: every problem is reported as a
//! structured [`RedirectOutcome::Aborted`] carrying the last URL reached,
//! which the caller can still attempt to scrape.

use std::collections::HashSet;

use reqwest::Url;
use tracing::debug;

use crate::classify::SiteTable;
use crate::fetch::FetchClient;

/// Maximum redirect hops before resolution is abandoned.
pub const MAX_REDIRECT_HOPS: u32 = 10;

/// Result of following a redirect chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Chain ended on a non-redirect response.
    Resolved { url: String, hops: u32 },
    /// Chain could not be followed to completion. `last_url` is the furthest
    /// URL reached and is still worth scraping.
    Aborted {
        last_url: String,
        hops: u32,
        reason: AbortReason,
    },
}

impl RedirectOutcome {
    /// The URL to continue the pipeline with, resolved or not.
    pub fn url(&self) -> &str {
        match self {
            Self::Resolved { url, .. } => url,
            Self::Aborted { last_url, .. } => last_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// More than [`MAX_REDIRECT_HOPS`] redirects.
    HopCeiling,
    /// A URL repeated within the chain.
    RedirectLoop,
    /// Chain terminated on a host that is itself a redirect platform,
    /// typically an expired or invalid short link.
    StuckOnRedirectPlatform,
    /// Connection-level failure partway through the chain.
    Network(String),
}

/// Follows `url` hop by hop until a terminal response, a loop, the hop
/// ceiling, or a network failure.
pub async fn resolve_redirects(
    client: &FetchClient,
    table: &SiteTable,
    url: &str,
) -> RedirectOutcome {
    let mut current = url.to_owned();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(current.clone());
    let mut hops = 0u32;

    loop {
        if hops >= MAX_REDIRECT_HOPS {
            debug!(url, hops, "redirect hop ceiling reached");
            return RedirectOutcome::Aborted {
                last_url: current,
                hops,
                reason: AbortReason::HopCeiling,
            };
        }

        let step = match client.get_no_redirect(&current).await {
            Ok(step) => step,
            Err(err) => {
                debug!(url = %current, error = %err, "redirect hop failed");
                return RedirectOutcome::Aborted {
                    last_url: current,
                    hops,
                    reason: AbortReason::Network(err.to_string()),
                };
            }
        };

        let location = match (step.status, step.location) {
            (300..=399, Some(location)) => location,
            _ => {
                // Terminal response. If we are still sitting on a shortener
                // host the link is effectively dead.
                if is_redirect_platform(table, &current) {
                    return RedirectOutcome::Aborted {
                        last_url: current,
                        hops,
                        reason: AbortReason::StuckOnRedirectPlatform,
                    };
                }
                return RedirectOutcome::Resolved { url: current, hops };
            }
        };

        let next = match absolutize_location(&current, &location) {
            Some(next) => next,
            None => {
                debug!(url = %current, location, "unparsable redirect target");
                return RedirectOutcome::Aborted {
                    last_url: current,
                    hops,
                    reason: AbortReason::Network(format!("invalid redirect target: {location}")),
                };
            }
        };

        hops += 1;
        if !visited.insert(next.clone()) {
            debug!(url = %next, hops, "redirect loop detected");
            return RedirectOutcome::Aborted {
                last_url: next,
                hops,
                reason: AbortReason::RedirectLoop,
            };
        }
        debug!(from = %current, to = %next, hops, "following redirect");
        current = next;
    }
}

/// Resolves a possibly-relative `Location` header against the current URL.
fn absolutize_location(current: &str, location: &str) -> Option<String> {
    let base = Url::parse(current).ok()?;
    base.join(location).ok().map(|u| u.to_string())
}

fn is_redirect_platform(table: &SiteTable, url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .is_some_and(|host| table.is_redirect_host(&host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_location_joins_against_current() {
        assert_eq!(
            absolutize_location("https://bit.ly/abc", "/expanded").as_deref(),
            Some("https://bit.ly/expanded")
        );
        assert_eq!(
            absolutize_location("https://bit.ly/abc", "https://shop.com/p/1").as_deref(),
            Some("https://shop.com/p/1")
        );
    }

    #[test]
    fn outcome_url_accessor_covers_both_arms() {
        let resolved = RedirectOutcome::Resolved {
            url: "https://shop.com/p/1".to_owned(),
            hops: 2,
        };
        assert_eq!(resolved.url(), "https://shop.com/p/1");

        let aborted = RedirectOutcome::Aborted {
            last_url: "https://bit.ly/abc".to_owned(),
            hops: 10,
            reason: AbortReason::HopCeiling,
        };
        assert_eq!(aborted.url(), "https://bit.ly/abc");
    }
}
