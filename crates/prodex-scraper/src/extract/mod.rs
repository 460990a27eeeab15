//! Extraction strategies and the merge policy between them.
//!
//! Every page goes through the same precedence chain regardless of site:
//!
//! 1. embedded structured data (JSON-LD `Product`) — highest fidelity;
//! 2. DOM selector lists (per-site descriptor, or generic heuristics);
//! 3. `<meta>` tags (`og:title`, `og:image`, `og:description`) as a last
//!    resort for name/image/description.
//!
//! Later strategies only fill fields earlier ones left empty; image lists
//! are concatenated in discovery order (structured data first) and
//! de-duplicated.

pub(crate) mod dom;
pub(crate) mod generic;
pub(crate) mod shopify;
pub(crate) mod slug;
pub(crate) mod structured;

pub use structured::{extract_jsonld_product, extract_meta_tags};

pub(crate) use shopify::looks_like_shopify;
pub(crate) use slug::title_from_slug;

use prodex_core::FieldSelectors;

use crate::types::RawProduct;

/// Runs the full strategy chain over already-fetched HTML.
pub(crate) fn extract_from_html(html: &str, url: &str, selectors: &FieldSelectors) -> RawProduct {
    let mut raw = RawProduct::new(url);

    let structured = structured::extract_jsonld_product(html);
    if let Some(structured) = &structured {
        raw.source = Some("jsonld");
        raw.name = structured.name.clone();
        raw.brand = structured.brand.clone();
        raw.price = structured.price.clone();
        raw.original_price = structured.original_price.clone();
        raw.description = structured.description.clone();
        raw.sku = structured.sku.clone();
        raw.category_hint = structured.category.clone();
        raw.material = structured.material.clone();
        raw.in_stock = structured.in_stock;

        let origin = crate::fetch::extract_origin(url);
        for image in &structured.images {
            if let Some(absolute) = dom::absolutize_image(image, origin.as_deref()) {
                if !dom::is_low_value_asset(&absolute) && !raw.images.contains(&absolute) {
                    raw.images.push(absolute);
                }
            }
        }
    }

    let dom_result = dom::extract_dom(html, selectors, url);
    if raw.source.is_none() && dom_result.name.is_some() {
        raw.source = Some("dom");
    }
    raw.name = raw.name.or(dom_result.name);
    raw.brand = raw.brand.or(dom_result.brand);
    raw.price = raw.price.or(dom_result.price);
    raw.original_price = raw.original_price.or(dom_result.original_price);
    raw.description = raw.description.or(dom_result.description);
    raw.sku = raw.sku.or(dom_result.sku);
    raw.material = raw.material.or(dom_result.material);
    raw.in_stock = raw.in_stock.or(dom_result.in_stock);
    if raw.sizes.is_empty() {
        raw.sizes = dom_result.sizes;
    }
    if raw.colors.is_empty() {
        raw.colors = dom_result.colors;
    }
    for image in dom_result.images {
        if !raw.images.contains(&image) {
            raw.images.push(image);
        }
    }

    // Meta tags: last resort for name/image/description only.
    if raw.name.is_none() || raw.images.is_empty() || raw.description.is_none() {
        let meta = structured::extract_meta_tags(html);
        if raw.name.is_none() && meta.title.is_some() {
            if raw.source.is_none() {
                raw.source = Some("meta");
            }
            raw.name = meta.title;
        }
        raw.description = raw.description.or(meta.description);
        if let Some(image) = meta.image {
            let origin = crate::fetch::extract_origin(url);
            if let Some(absolute) = dom::absolutize_image(&image, origin.as_deref()) {
                if !dom::is_low_value_asset(&absolute) && !raw.images.contains(&absolute) {
                    raw.images.push(absolute);
                }
            }
        }
    }

    if raw.is_empty() {
        raw.error = Some("no product data found on page".to_owned());
    }

    raw
}
