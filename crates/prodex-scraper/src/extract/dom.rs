//! Descriptor-driven DOM extraction engine.
//!
//! One engine serves every retailer: per-field ordered selector lists come
//! from the site's [`FieldSelectors`] descriptor, and within each list the
//! first selector yielding a non-empty value wins. Selector strings are
//! config data, so an unparsable selector is logged and skipped, never fatal.

use prodex_core::FieldSelectors;
use scraper::{ElementRef, Html, Selector};

/// Fields recovered by selector scraping. Merged after structured data.
#[derive(Debug, Clone, Default)]
pub struct DomProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub sku: Option<String>,
    pub material: Option<String>,
    pub in_stock: Option<bool>,
}

/// Runs the selector lists against `html`. `page_url` supplies the origin for
/// absolutizing relative image URLs.
pub fn extract_dom(html: &str, selectors: &FieldSelectors, page_url: &str) -> DomProduct {
    let document = Html::parse_document(html);
    let origin = crate::fetch::extract_origin(page_url);

    let availability_text = first_text(&document, &selectors.availability);

    DomProduct {
        name: first_text(&document, &selectors.name),
        brand: first_text(&document, &selectors.brand),
        price: first_text(&document, &selectors.price),
        original_price: first_text(&document, &selectors.original_price),
        description: first_text(&document, &selectors.description),
        images: collect_images(&document, &selectors.images, origin.as_deref()),
        sizes: all_texts(&document, &selectors.sizes),
        colors: all_texts(&document, &selectors.colors),
        sku: first_text(&document, &selectors.sku),
        material: first_text(&document, &selectors.material),
        in_stock: availability_text.as_deref().and_then(interpret_availability),
    }
}

/// First non-empty value across the ordered candidate list.
fn first_text(document: &Html, candidates: &[String]) -> Option<String> {
    for raw_selector in candidates {
        let selector = match Selector::parse(raw_selector) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(selector = raw_selector, error = %e, "skipping invalid selector");
                continue;
            }
        };
        for element in document.select(&selector) {
            if let Some(value) = element_value(element) {
                return Some(value);
            }
        }
    }
    None
}

/// All non-empty values from the FIRST candidate selector that matches
/// anything, de-duplicated in document order. Used for sizes/colors where
/// one selector enumerates variants.
fn all_texts(document: &Html, candidates: &[String]) -> Vec<String> {
    for raw_selector in candidates {
        let selector = match Selector::parse(raw_selector) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(selector = raw_selector, error = %e, "skipping invalid selector");
                continue;
            }
        };
        let mut values = Vec::new();
        for element in document.select(&selector) {
            if let Some(value) = element_value(element) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        if !values.is_empty() {
            return values;
        }
    }
    Vec::new()
}

/// Pulls a display value out of an element: `content` for meta-like tags,
/// `value` for inputs/options, `alt` for image swatches, otherwise the
/// trimmed text content.
fn element_value(element: ElementRef<'_>) -> Option<String> {
    for attr in ["content", "value"] {
        if let Some(v) = element.value().attr(attr) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    if element.value().name() == "img" {
        if let Some(alt) = element.value().attr("alt") {
            let alt = alt.trim();
            if !alt.is_empty() {
                return Some(alt.to_string());
            }
        }
    }
    let text = element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Gathers image URLs across ALL image selectors (galleries are often split
/// over several), absolutized and filtered, de-duplicated in discovery order.
fn collect_images(document: &Html, candidates: &[String], origin: Option<&str>) -> Vec<String> {
    let mut images = Vec::new();
    for raw_selector in candidates {
        let selector = match Selector::parse(raw_selector) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(selector = raw_selector, error = %e, "skipping invalid selector");
                continue;
            }
        };
        for element in document.select(&selector) {
            let raw_url = ["src", "data-src", "data-lazy-src", "content"]
                .iter()
                .find_map(|attr| element.value().attr(attr))
                .or_else(|| {
                    // srcset: take the first candidate URL.
                    element
                        .value()
                        .attr("srcset")
                        .and_then(|s| s.split_whitespace().next())
                });
            let Some(raw_url) = raw_url else { continue };
            let Some(absolute) = absolutize_image(raw_url, origin) else {
                continue;
            };
            if is_low_value_asset(&absolute) {
                continue;
            }
            if !images.contains(&absolute) {
                images.push(absolute);
            }
        }
    }
    images
}

/// Rewrites protocol-relative (`//`) and root-relative (`/`) URLs to absolute
/// against the page's own origin. Already-absolute URLs pass through.
pub(crate) fn absolutize_image(raw: &str, origin: Option<&str>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("data:") {
        return Some(raw.to_string());
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if raw.starts_with('/') {
        return origin.map(|o| format!("{o}{raw}"));
    }
    // Relative path without a leading slash; resolve against the origin root.
    origin.map(|o| format!("{o}/{raw}"))
}

/// Filters placeholders, tracking pixels, 1×1 spacers, and inlined data URIs
/// out of the image list.
pub(crate) fn is_low_value_asset(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.starts_with("data:")
        || lower.contains("1x1")
        || lower.contains("pixel")
        || lower.contains("placeholder")
        || lower.contains("spacer")
        || lower.contains("transparent.")
        || lower.contains("blank.")
        || lower.contains("loading.gif")
}

/// Maps availability text to a stock flag; unknown wording stays `None`.
fn interpret_availability(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    if lower.contains("out of stock") || lower.contains("sold out") || lower.contains("unavailable")
    {
        Some(false)
    } else if lower.contains("in stock") || lower.contains("add to cart") || lower.contains("add to bag")
    {
        Some(true)
    } else {
        None
    }
}
