//! Pipeline data shapes.
//!
//! [`RawProduct`] is the heterogeneous extractor output: an unordered bag of
//! optional fields, one instance per scrape attempt, consumed immediately by
//! the normalizer. Extractors never raise for recoverable conditions — they
//! return a `RawProduct` carrying `error`/`blocked` flags instead, so the
//! router can tell a degraded-but-structured result (soft failure) from a
//! genuine exception (hard failure).

use serde::Serialize;

/// Raw, site-shaped extractor output. Every extractor returns one of these;
/// the only guaranteed field is `url`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawProduct {
    pub url: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    /// Price as found on the page: may be `"$49.99"`, `"1.299,00"`, `"49.99"`.
    /// Numeric coercion is the normalizer's job.
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub description: Option<String>,
    /// Absolute URLs, discovery order, de-duplicated.
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub sku: Option<String>,
    pub material: Option<String>,
    pub category_hint: Option<String>,
    pub in_stock: Option<bool>,
    /// Which strategy produced the bulk of this record
    /// (`"jsonld"`, `"dom"`, `"shopify"`, `"meta"`, `"slug"`).
    pub source: Option<&'static str>,
    /// Soft-failure annotation. Present means the record is degraded but the
    /// request as a whole did not fail.
    pub error: Option<String>,
    /// The fetch hit a bot-protection wall; fields were salvaged from the URL.
    pub blocked: bool,
    pub needs_manual_check: bool,
}

impl RawProduct {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// A completed-but-insufficient extraction.
    pub fn soft_failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// A bot-blocked fetch: salvage a display name from the URL slug and flag
    /// the record for manual review rather than failing the request.
    pub fn blocked(url: impl Into<String>, marker: &str, salvaged_name: Option<String>) -> Self {
        Self {
            url: url.into(),
            name: salvaged_name,
            source: Some("slug"),
            error: Some(format!("blocked by bot protection ({marker})")),
            blocked: true,
            needs_manual_check: true,
            ..Self::default()
        }
    }

    /// True when no downstream consumer could do anything useful with this
    /// record.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.images.is_empty()
            && self.description.is_none()
    }
}

/// Canonical normalized record — one shape for every site, one name per
/// field. The dual-keyed compatibility JSON is produced only at the
/// serialization boundary by [`crate::envelope`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProduct {
    pub name: String,
    pub brand: String,
    pub sale_price: f64,
    pub original_price: f64,
    pub is_on_sale: bool,
    /// Integer percent, `round((1 - sale/original) * 100)`; `None` when not
    /// on sale.
    pub discount_percentage: Option<i32>,
    pub sale_badge: Option<String>,
    pub image_urls: Vec<String>,
    /// The originally requested URL, not any internally-followed one (the
    /// redirect resolver is the single exception, where following the URL is
    /// the operation itself).
    pub vendor_url: String,
    pub color: Option<String>,
    pub category: String,
    pub material: Option<String>,
    pub description: String,
    pub sizes: Vec<String>,
    pub sku: Option<String>,
    pub in_stock: bool,
    pub error: Option<String>,
    pub blocked: bool,
    pub needs_manual_check: bool,
}

impl NormalizedProduct {
    /// Whether the record carries data a caller can actually show: a name or
    /// a non-zero price. This is what the envelope's `success` flag reports.
    pub fn has_usable_data(&self) -> bool {
        !self.name.is_empty() || self.sale_price > 0.0
    }
}
