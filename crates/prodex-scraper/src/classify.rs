//! URL → handler classification.
//!
//! Classification is pure and total over well-formed URLs: the hostname is
//! matched case-insensitively against the ordered descriptor table (first
//! match wins — table order IS the tie-break policy), then against the
//! redirect-platform list, then the static Shopify host allow-list, and
//! finally falls back to the generic handler. All extraction failure is
//! deferred to the extractor stage.

use std::sync::Arc;

use prodex_core::{SiteDescriptor, SitesFile};

use crate::error::ScrapeError;

/// Which extraction routine handles a URL.
#[derive(Debug, Clone)]
pub enum Handler {
    /// A retailer with a dedicated descriptor.
    Site(Arc<SiteDescriptor>),
    /// A known Shopify storefront without a dedicated descriptor.
    Shopify,
    /// An affiliate/shortener link that must be resolved first.
    Redirect,
    /// No match; generic heuristics (with a dynamic Shopify check) apply.
    Generic,
}

impl Handler {
    /// Stable identifier for logging and envelopes.
    pub fn id(&self) -> &str {
        match self {
            Handler::Site(desc) => &desc.id,
            Handler::Shopify => "shopify",
            Handler::Redirect => "redirect",
            Handler::Generic => "generic",
        }
    }
}

/// Compiled classification table: descriptor host patterns in file order,
/// then redirect hosts, then the Shopify allow-list.
#[derive(Debug, Clone)]
pub struct SiteTable {
    /// `(hostname substring, descriptor index)` in match order.
    entries: Vec<(String, usize)>,
    descriptors: Vec<Arc<SiteDescriptor>>,
    redirect_hosts: Vec<String>,
    shopify_hosts: Vec<String>,
}

impl SiteTable {
    pub fn from_sites_file(file: SitesFile) -> Self {
        let descriptors: Vec<Arc<SiteDescriptor>> =
            file.sites.into_iter().map(Arc::new).collect();

        let mut entries = Vec::new();
        for (idx, desc) in descriptors.iter().enumerate() {
            for pattern in &desc.host_patterns {
                entries.push((pattern.to_lowercase(), idx));
            }
        }

        Self {
            entries,
            descriptors,
            redirect_hosts: file
                .redirect_hosts
                .into_iter()
                .map(|h| h.to_lowercase())
                .collect(),
            shopify_hosts: file
                .shopify_hosts
                .into_iter()
                .map(|h| h.to_lowercase())
                .collect(),
        }
    }

    pub fn redirect_hosts(&self) -> &[String] {
        &self.redirect_hosts
    }

    /// Whether `host` belongs to a known redirect platform (never a terminal
    /// product page). Used by the redirect resolver's abort check.
    pub fn is_redirect_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.redirect_hosts.iter().any(|h| host.contains(h.as_str()))
    }
}

/// Classify a URL into a [`Handler`].
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidUrl`] if the URL cannot be parsed into a
/// hostname. This is the only failure mode; every syntactically valid URL
/// classifies to some handler.
pub fn classify(url: &str, table: &SiteTable) -> Result<Handler, ScrapeError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ScrapeError::InvalidUrl {
            url: url.to_owned(),
            reason: "URL has no hostname".to_owned(),
        })?
        .to_lowercase();

    for (pattern, idx) in &table.entries {
        if host.contains(pattern.as_str()) {
            return Ok(Handler::Site(Arc::clone(&table.descriptors[*idx])));
        }
    }

    if table.is_redirect_host(&host) {
        return Ok(Handler::Redirect);
    }

    if table.shopify_hosts.iter().any(|h| host.contains(h.as_str())) {
        return Ok(Handler::Shopify);
    }

    Ok(Handler::Generic)
}
