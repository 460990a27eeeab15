//! Response envelope and compatibility JSON.
//!
//! The wire shape predates this service, and existing consumers read a mix
//! of snake_case and camelCase keys for the same fields. Rather than model
//! that mess as a struct, the canonical [`NormalizedProduct`] is converted
//! to JSON at the serialization boundary, writing every aliased field under
//! both keys. The two copies are always written from the same value, so
//! they cannot disagree.

use serde::Serialize;
use serde_json::{json, Value};

use crate::types::NormalizedProduct;

/// Top-level scrape response.
///
/// `success` reports data usability, not internal health: a degraded record
/// (bot-blocked, partial) with a name or price still counts as success, and
/// a clean run that found nothing does not.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub success: bool,
    pub product: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeOutcome {
    /// Wraps a normalized record, deriving `success` from
    /// [`NormalizedProduct::has_usable_data`].
    pub fn from_product(product: &NormalizedProduct) -> Self {
        Self {
            success: product.has_usable_data(),
            error: if product.has_usable_data() {
                None
            } else {
                product
                    .error
                    .clone()
                    .or_else(|| Some("no product data found".to_owned()))
            },
            product: Some(dual_key_json(product)),
        }
    }

    /// A hard failure: the pipeline raised instead of producing a record.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            product: None,
            error: Some(message.into()),
        }
    }
}

/// Serializes a product with each aliased field under both its snake_case
/// and camelCase key.
pub fn dual_key_json(product: &NormalizedProduct) -> Value {
    json!({
        "product_name": product.name,
        "name": product.name,
        "brand": product.brand,
        "sale_price": product.sale_price,
        "price": product.sale_price,
        "original_price": product.original_price,
        "originalPrice": product.original_price,
        "is_on_sale": product.is_on_sale,
        "isOnSale": product.is_on_sale,
        "discount_percentage": product.discount_percentage,
        "discountPercentage": product.discount_percentage,
        "sale_badge": product.sale_badge,
        "saleBadge": product.sale_badge,
        "image_urls": product.image_urls,
        "images": product.image_urls,
        "vendor_url": product.vendor_url,
        "vendorUrl": product.vendor_url,
        "color": product.color,
        "category": product.category,
        "material": product.material,
        "description": product.description,
        "sizes": product.sizes,
        "sku": product.sku,
        "in_stock": product.in_stock,
        "inStock": product.in_stock,
        "error": product.error,
        "blocked": product.blocked,
        "needs_manual_check": product.needs_manual_check,
        "needsManualCheck": product.needs_manual_check,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawProduct;

    fn sample_product() -> NormalizedProduct {
        use prodex_core::KeywordCategoryDetector;

        let mut raw = RawProduct::new("https://shop.com/p/1");
        raw.name = Some("Wool Coat".to_owned());
        raw.price = Some("$75.00".to_owned());
        raw.original_price = Some("$100.00".to_owned());
        raw.images = vec!["https://cdn.shop.com/a.jpg".to_owned()];
        crate::normalize::normalize(
            raw,
            "https://shop.com/p/1",
            &crate::normalize::SiteDefaults::default(),
            &KeywordCategoryDetector::default(),
        )
    }

    #[test]
    fn aliased_keys_always_agree() {
        let value = dual_key_json(&sample_product());
        for (snake, camel) in [
            ("product_name", "name"),
            ("sale_price", "price"),
            ("original_price", "originalPrice"),
            ("is_on_sale", "isOnSale"),
            ("discount_percentage", "discountPercentage"),
            ("sale_badge", "saleBadge"),
            ("image_urls", "images"),
            ("vendor_url", "vendorUrl"),
            ("in_stock", "inStock"),
            ("needs_manual_check", "needsManualCheck"),
        ] {
            assert_eq!(value[snake], value[camel], "mismatch for {snake}/{camel}");
        }
    }

    #[test]
    fn usable_product_is_a_success() {
        let outcome = ScrapeOutcome::from_product(&sample_product());
        assert!(outcome.success);
        assert!(outcome.error.is_none());
        let product = outcome.product.expect("product present");
        assert_eq!(product["name"], "Wool Coat");
        assert_eq!(product["discountPercentage"], 25);
    }

    #[test]
    fn empty_product_is_a_soft_failure_with_record() {
        use prodex_core::KeywordCategoryDetector;
        let empty = crate::normalize::normalize(
            RawProduct::new("https://shop.com/p/1"),
            "https://shop.com/p/1",
            &crate::normalize::SiteDefaults::default(),
            &KeywordCategoryDetector::default(),
        );
        let outcome = ScrapeOutcome::from_product(&empty);
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
        // The degraded record is still attached for inspection.
        assert!(outcome.product.is_some());
    }

    #[test]
    fn hard_failure_has_no_product() {
        let outcome = ScrapeOutcome::from_error("invalid URL: not-a-url");
        assert!(!outcome.success);
        assert!(outcome.product.is_none());
        assert_eq!(outcome.error.as_deref(), Some("invalid URL: not-a-url"));
    }

    #[test]
    fn error_key_omitted_on_success() {
        let outcome = ScrapeOutcome::from_product(&sample_product());
        let serialized = serde_json::to_value(&outcome).expect("serializes");
        assert!(serialized.get("error").is_none());
        assert_eq!(serialized["success"], true);
    }
}
