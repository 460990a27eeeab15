//! Raw-to-canonical conversion.
//!
//! Normalization is total: any [`RawProduct`], however sparse, produces a
//! [`NormalizedProduct`]. Missing strings become empty strings, missing
//! prices become `0.0`, and the caller decides usability via
//! [`NormalizedProduct::has_usable_data`].

use std::sync::OnceLock;

use regex::Regex;

use prodex_core::CategoryDetect;

use crate::types::{NormalizedProduct, RawProduct};

/// Brand label used when neither the page nor a site descriptor supplies one.
pub const UNKNOWN_BRAND: &str = "Unknown Brand";

/// Per-site defaults applied when the raw record lacks a field.
#[derive(Debug, Clone)]
pub struct SiteDefaults {
    /// Brand used when the page did not expose one (retailer house brands,
    /// single-brand storefronts).
    pub brand_fallback: String,
    /// Descriptor-level category hint, weaker than a hint found on the page.
    pub category_hint: Option<String>,
}

/// The defaults for hosts without a descriptor (Shopify allow-list entries
/// and generic pages): `brand` still gets a label, never an empty string.
impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            brand_fallback: UNKNOWN_BRAND.to_owned(),
            category_hint: None,
        }
    }
}

/// Converts an extractor record into the canonical shape.
///
/// `requested_url` is the URL the caller asked for and is what lands in
/// `vendor_url`, regardless of any fetch-time redirects.
pub fn normalize(
    raw: RawProduct,
    requested_url: &str,
    defaults: &SiteDefaults,
    detector: &dyn CategoryDetect,
) -> NormalizedProduct {
    let name = raw.name.unwrap_or_default().trim().to_owned();
    let brand = raw
        .brand
        .map(|b| b.trim().to_owned())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| defaults.brand_fallback.clone());
    let description = raw.description.unwrap_or_default().trim().to_owned();

    let sale_price = raw.price.as_deref().map_or(0.0, parse_price);
    let mut original_price = raw.original_price.as_deref().map_or(0.0, parse_price);
    if original_price <= 0.0 {
        original_price = sale_price;
    }

    let is_on_sale = original_price > sale_price && sale_price > 0.0;
    #[allow(clippy::cast_possible_truncation)]
    let discount_percentage = is_on_sale
        .then(|| ((1.0 - sale_price / original_price) * 100.0).round() as i32)
        .filter(|pct| *pct > 0);
    let sale_badge = is_on_sale.then(|| "SALE".to_owned());

    let hint = raw
        .category_hint
        .as_deref()
        .or(defaults.category_hint.as_deref());
    let category = detector.detect(&name, &description, &brand, hint);

    NormalizedProduct {
        name,
        brand,
        sale_price,
        original_price,
        is_on_sale,
        discount_percentage,
        sale_badge,
        image_urls: raw.images,
        vendor_url: requested_url.to_owned(),
        color: raw.colors.first().cloned(),
        category,
        material: raw.material,
        description,
        sizes: raw.sizes,
        sku: raw.sku,
        in_stock: raw.in_stock.unwrap_or(true),
        error: raw.error,
        blocked: raw.blocked,
        needs_manual_check: raw.needs_manual_check,
    }
}

/// Extracts a numeric value from a price string as found on a page:
/// `"$49.99"`, `"USD 1,299.00"`, `"49.99"`. Returns `0.0` when no number is
/// present.
pub fn parse_price(text: &str) -> f64 {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PRICE_RE.get_or_init(|| Regex::new(r"\d[\d,]*\.?\d*").expect("static price pattern"));

    re.find(text)
        .map(|m| m.as_str().replace(',', ""))
        .and_then(|digits| digits.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
