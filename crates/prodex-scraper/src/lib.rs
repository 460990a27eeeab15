//! Product page scraping pipeline.
//!
//! A URL goes through classification ([`classify`]), optional short-link
//! resolution ([`redirect`]), fetching ([`fetch`]), strategy-chain
//! extraction ([`extract`]), normalization ([`normalize`]) and finally the
//! response envelope ([`envelope`]). [`ProductScraper`] wires the stages
//! together and owns the failure-containment boundary.

pub mod classify;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod redirect;
pub mod router;
pub mod types;

pub use classify::{classify, Handler, SiteTable};
pub use envelope::{dual_key_json, ScrapeOutcome};
pub use error::ScrapeError;
pub use fetch::{BrowserConfig, BrowserFetcher, FetchClient, FetchConfig};
pub use normalize::{normalize, parse_price, SiteDefaults, UNKNOWN_BRAND};
pub use redirect::{resolve_redirects, AbortReason, RedirectOutcome, MAX_REDIRECT_HOPS};
pub use router::ProductScraper;
pub use types::{NormalizedProduct, RawProduct};
