//! Shopify-universal extractor.
//!
//! Any Shopify storefront exposes `GET /products/<handle>.json` next to the
//! product page; that endpoint is higher-fidelity than DOM scraping and is
//! tried first. Pages without a `/products/` path (or stores with the JSON
//! endpoint disabled) fall through to the page-level strategies in
//! [`crate::extract`].

use serde::Deserialize;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::types::RawProduct;

/// Response envelope from `GET /products/<handle>.json`.
#[derive(Debug, Deserialize)]
struct ShopifyProductEnvelope {
    product: ShopifyProduct,
}

/// A product from a Shopify storefront's public JSON endpoint.
#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    title: String,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    body_html: Option<String>,
    /// Category string; may be empty ("") — treated as absent.
    #[serde(default)]
    product_type: Option<String>,
    variants: Vec<ShopifyVariant>,
    #[serde(default)]
    images: Vec<ShopifyImage>,
    #[serde(default)]
    options: Vec<ShopifyOption>,
}

#[derive(Debug, Deserialize)]
struct ShopifyVariant {
    /// Current price as a decimal string (e.g. `"30.00"`). Never null.
    price: String,
    /// Pre-sale price, or `null` when the variant is not on sale.
    #[serde(default)]
    compare_at_price: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    /// Absent from some stores' public endpoint; `None` means unknown.
    #[serde(default)]
    available: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ShopifyImage {
    src: String,
}

/// Variant axis (`Size`, `Color`, ...) with its value list.
#[derive(Debug, Deserialize)]
struct ShopifyOption {
    name: String,
    #[serde(default)]
    values: Vec<String>,
}

/// Builds the product JSON endpoint for a storefront product URL, or `None`
/// when the URL does not point at a product page.
pub(crate) fn product_json_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let path = parsed.path().trim_end_matches('/');
    if !path.contains("/products/") {
        return None;
    }
    let origin = crate::fetch::extract_origin(url)?;
    Some(format!("{origin}{path}.json"))
}

/// Extracts a product via the storefront JSON endpoint.
///
/// # Errors
///
/// Propagates fetch errors; returns [`ScrapeError::Deserialize`] when the
/// endpoint responds with a body that is not the expected product envelope
/// (some stores disable it and serve HTML instead). Callers treat any error
/// here as "fall through to page-level extraction".
pub(crate) async fn extract_product_json(
    client: &FetchClient,
    url: &str,
    json_url: &str,
) -> Result<RawProduct, ScrapeError> {
    let page = client.get_html(json_url).await?;
    let envelope: ShopifyProductEnvelope =
        serde_json::from_str(&page.body).map_err(|e| ScrapeError::Deserialize {
            context: format!("shopify product json from {json_url}"),
            source: e,
        })?;

    Ok(raw_from_shopify(envelope.product, url))
}

fn raw_from_shopify(product: ShopifyProduct, url: &str) -> RawProduct {
    let mut raw = RawProduct::new(url);
    raw.source = Some("shopify");
    raw.name = Some(product.title);
    raw.brand = product.vendor.filter(|v| !v.is_empty());
    raw.description = product.body_html.as_deref().map(strip_html);
    raw.category_hint = product.product_type.filter(|t| !t.is_empty());
    raw.images = product.images.into_iter().map(|i| i.src).collect();

    for option in product.options {
        if option.name.eq_ignore_ascii_case("size") {
            raw.sizes = option.values.clone();
        } else if option.name.eq_ignore_ascii_case("color")
            || option.name.eq_ignore_ascii_case("colour")
        {
            raw.colors = option.values.clone();
        }
    }

    if let Some(first) = product.variants.first() {
        raw.price = Some(first.price.clone());
        // `compare_at_price` is null (not "0.00") when no sale is active.
        raw.original_price = first
            .compare_at_price
            .clone()
            .filter(|p| !p.is_empty() && p != "0.00");
        raw.sku = first.sku.clone().filter(|s| !s.is_empty());
    }

    // In stock when any variant reports availability; unknown stays None.
    let availabilities: Vec<bool> = product
        .variants
        .iter()
        .filter_map(|v| v.available)
        .collect();
    if !availabilities.is_empty() {
        raw.in_stock = Some(availabilities.into_iter().any(|a| a));
    }

    raw
}

/// Collapses `body_html` to plain text: tags stripped, whitespace normalized.
fn strip_html(html: &str) -> String {
    let re = regex::Regex::new(r"<[^>]+>").expect("valid regex");
    let text = re.replace_all(html, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heuristic Shopify-platform check for unmatched hosts: platform-identifying
/// substrings in the raw page HTML.
pub(crate) fn looks_like_shopify(html: &str) -> bool {
    const SIGNATURES: &[&str] = &[
        "cdn.shopify.com",
        "Shopify.theme",
        "shopify-section",
        "window.Shopify",
        "shopify-features",
    ];
    SIGNATURES.iter().any(|sig| html.contains(sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> ShopifyProduct {
        serde_json::from_value(serde_json::json!({
            "id": 123,
            "title": "Wool Runner",
            "vendor": "Allbirds",
            "body_html": "<p>Soft <b>wool</b> sneaker.</p>",
            "product_type": "Shoes",
            "variants": [
                {"id": 1, "title": "8", "price": "98.00",
                 "compare_at_price": "120.00", "sku": "WR-8", "available": true},
                {"id": 2, "title": "9", "price": "98.00",
                 "compare_at_price": null, "sku": "WR-9", "available": false}
            ],
            "images": [{"src": "https://cdn.shopify.com/s/files/wr-1.jpg"},
                       {"src": "https://cdn.shopify.com/s/files/wr-2.jpg"}],
            "options": [{"name": "Size", "values": ["8", "9"]},
                        {"name": "Color", "values": ["Natural Grey"]}]
        }))
        .unwrap()
    }

    #[test]
    fn product_json_url_appends_extension() {
        assert_eq!(
            product_json_url("https://www.allbirds.com/products/wool-runner?variant=1").as_deref(),
            Some("https://www.allbirds.com/products/wool-runner.json")
        );
    }

    #[test]
    fn product_json_url_strips_trailing_slash() {
        assert_eq!(
            product_json_url("https://shop.example.com/products/tee/").as_deref(),
            Some("https://shop.example.com/products/tee.json")
        );
    }

    #[test]
    fn non_product_paths_have_no_json_url() {
        assert_eq!(product_json_url("https://shop.example.com/collections/all"), None);
    }

    #[test]
    fn maps_first_variant_prices() {
        let raw = raw_from_shopify(sample_product(), "https://www.allbirds.com/products/wool-runner");
        assert_eq!(raw.price.as_deref(), Some("98.00"));
        assert_eq!(raw.original_price.as_deref(), Some("120.00"));
        assert_eq!(raw.sku.as_deref(), Some("WR-8"));
    }

    #[test]
    fn maps_options_to_sizes_and_colors() {
        let raw = raw_from_shopify(sample_product(), "https://x.com/products/p");
        assert_eq!(raw.sizes, vec!["8", "9"]);
        assert_eq!(raw.colors, vec!["Natural Grey"]);
    }

    #[test]
    fn any_available_variant_means_in_stock() {
        let raw = raw_from_shopify(sample_product(), "https://x.com/products/p");
        assert_eq!(raw.in_stock, Some(true));
    }

    #[test]
    fn body_html_is_stripped_to_text() {
        let raw = raw_from_shopify(sample_product(), "https://x.com/products/p");
        assert_eq!(raw.description.as_deref(), Some("Soft wool sneaker."));
    }

    #[test]
    fn vendor_becomes_brand_and_type_becomes_hint() {
        let raw = raw_from_shopify(sample_product(), "https://x.com/products/p");
        assert_eq!(raw.brand.as_deref(), Some("Allbirds"));
        assert_eq!(raw.category_hint.as_deref(), Some("Shoes"));
    }

    #[test]
    fn signature_check_detects_the_platform() {
        assert!(looks_like_shopify(
            r#"<script src="https://cdn.shopify.com/s/x.js"></script>"#
        ));
        assert!(looks_like_shopify("<div class=\"shopify-section\"></div>"));
        assert!(!looks_like_shopify("<html><body>plain store</body></html>"));
    }
}
