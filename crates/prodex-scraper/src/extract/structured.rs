//! Structured-data extraction: JSON-LD `Product` blocks and `<meta>` tags.
//!
//! Structured data is tried before any DOM selector because it is
//! higher-fidelity and far less brittle than scraping rendered markup.
//! Every parse attempt is a `Result` internally; a malformed block is logged
//! at debug level and skipped rather than aborting the page — one bad
//! `<script>` must not cost us the good one next to it.

use scraper::{Html, Selector};

/// Product fields recovered from embedded structured data.
#[derive(Debug, Clone, Default)]
pub struct StructuredProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub in_stock: Option<bool>,
}

impl StructuredProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.images.is_empty()
    }
}

/// Last-resort fields from OpenGraph/standard meta tags.
#[derive(Debug, Clone, Default)]
pub struct MetaTags {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Extracts the first JSON-LD `Product` object from the page.
///
/// Accepts a top-level object, a top-level array, and `@graph` containers;
/// `@type` may be a string or an array of strings.
pub fn extract_jsonld_product(html: &str) -> Option<StructuredProduct> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector");

    for element in document.select(&selector) {
        let json_text: String = element.text().collect();
        let value: serde_json::Value = match serde_json::from_str(&json_text) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        let mut candidates: Vec<serde_json::Value> = match value {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        };

        // Expand @graph containers: many sites wrap structured data inside
        // {"@graph": [...]} at the top level.
        let mut expanded = Vec::new();
        for item in &candidates {
            if let Some(graph) = item.get("@graph").and_then(serde_json::Value::as_array) {
                expanded.extend(graph.iter().cloned());
            }
        }
        candidates.extend(expanded);

        for item in candidates {
            if let Some(product) = jsonld_item_to_product(&item) {
                return Some(product);
            }
        }
    }

    None
}

/// Convert a single JSON-LD object to a `StructuredProduct`, if it is a
/// `Product` (or `ProductGroup`).
fn jsonld_item_to_product(item: &serde_json::Value) -> Option<StructuredProduct> {
    let type_node = item.get("@type")?;
    let accepted_types = ["Product", "ProductGroup", "IndividualProduct"];

    // `@type` may be a plain string OR an array of strings.
    let type_matches = if let Some(s) = type_node.as_str() {
        accepted_types.iter().any(|t| s.eq_ignore_ascii_case(t))
    } else if let Some(arr) = type_node.as_array() {
        arr.iter()
            .filter_map(|v| v.as_str())
            .any(|s| accepted_types.iter().any(|t| s.eq_ignore_ascii_case(t)))
    } else {
        false
    };
    if !type_matches {
        return None;
    }

    let name = string_field(item, "name");
    let description = string_field(item, "description");
    let sku = string_field(item, "sku");
    let category = string_field(item, "category");
    let material = string_field(item, "material");

    // brand may be a plain string or an object {"@type": "Brand", "name": ...}.
    let brand = item.get("brand").and_then(|b| {
        b.as_str()
            .map(str::to_string)
            .or_else(|| b.get("name").and_then(|n| n.as_str()).map(str::to_string))
    });

    // image may be a string, an array of strings/objects, or an ImageObject.
    let images = match item.get("image") {
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Array(items)) => items.iter().filter_map(image_url).collect(),
        Some(obj @ serde_json::Value::Object(_)) => image_url(obj).into_iter().collect(),
        _ => Vec::new(),
    };

    let (price, original_price, in_stock) = extract_offer(item);

    Some(StructuredProduct {
        name,
        brand,
        price,
        original_price,
        description,
        images,
        sku,
        category,
        material,
        in_stock,
    })
}

/// Pulls price/availability from `offers`, which may be a single Offer, an
/// array of Offers, or an AggregateOffer carrying `lowPrice`/`highPrice`.
fn extract_offer(
    item: &serde_json::Value,
) -> (Option<String>, Option<String>, Option<bool>) {
    let offers = match item.get("offers") {
        Some(serde_json::Value::Array(items)) => items.first(),
        Some(offer) => Some(offer),
        None => None,
    };
    let Some(offer) = offers else {
        return (None, None, None);
    };

    let price = price_field(offer, "price").or_else(|| price_field(offer, "lowPrice"));
    // Some sites put the pre-sale price in highPrice on aggregate offers.
    let original_price = price_field(offer, "highPrice");

    let in_stock = offer
        .get("availability")
        .and_then(|v| v.as_str())
        .map(|s| s.contains("InStock") || s.contains("LimitedAvailability"));

    (price, original_price, in_stock)
}

/// Price values appear as strings and numbers in the wild.
fn price_field(offer: &serde_json::Value, key: &str) -> Option<String> {
    match offer.get(key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(item: &serde_json::Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn image_url(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .map(str::to_string)
        .or_else(|| {
            value
                .get("url")
                .and_then(|u| u.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            value
                .get("contentUrl")
                .and_then(|u| u.as_str())
                .map(str::to_string)
        })
}

/// Extracts OpenGraph (falling back to standard) meta tags.
pub fn extract_meta_tags(html: &str) -> MetaTags {
    let document = Html::parse_document(html);

    let meta_content = |property: &str| -> Option<String> {
        let selector = format!(r#"meta[property="{property}"], meta[name="{property}"]"#);
        let selector = Selector::parse(&selector).ok()?;
        document
            .select(&selector)
            .find_map(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = meta_content("og:title").or_else(|| {
        let selector = Selector::parse("title").expect("valid selector");
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    });

    MetaTags {
        title,
        image: meta_content("og:image"),
        description: meta_content("og:description").or_else(|| meta_content("description")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_basic_product_block() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@type": "Product",
                "name": "Test Shirt",
                "brand": {"@type": "Brand", "name": "Acme"},
                "image": ["https://cdn.example.com/shirt-front.jpg",
                          "https://cdn.example.com/shirt-back.jpg"],
                "sku": "TS-001",
                "offers": {"@type": "Offer", "price": "49.99",
                           "priceCurrency": "USD",
                           "availability": "https://schema.org/InStock"}
            }
            </script>
            </head></html>
        "#;
        let product = extract_jsonld_product(html).unwrap();
        assert_eq!(product.name.as_deref(), Some("Test Shirt"));
        assert_eq!(product.brand.as_deref(), Some("Acme"));
        assert_eq!(product.price.as_deref(), Some("49.99"));
        assert_eq!(product.images.len(), 2);
        assert_eq!(product.sku.as_deref(), Some("TS-001"));
        assert_eq!(product.in_stock, Some(true));
    }

    #[test]
    fn numeric_price_becomes_string() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "Product", "name": "Numbered",
             "offers": {"price": 120.5}}
            </script>
        "#;
        let product = extract_jsonld_product(html).unwrap();
        assert_eq!(product.price.as_deref(), Some("120.5"));
    }

    #[test]
    fn skips_malformed_block_and_uses_next() {
        let html = r#"
            <script type="application/ld+json">{not valid json</script>
            <script type="application/ld+json">
            {"@type": "Product", "name": "Survivor"}
            </script>
        "#;
        let product = extract_jsonld_product(html).unwrap();
        assert_eq!(product.name.as_deref(), Some("Survivor"));
    }

    #[test]
    fn non_product_types_ignored() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "BreadcrumbList", "name": "nav"}
            </script>
        "#;
        assert!(extract_jsonld_product(html).is_none());
    }

    #[test]
    fn product_inside_graph_container() {
        let html = r#"
            <script type="application/ld+json">
            {"@context": "https://schema.org",
             "@graph": [
                {"@type": "WebSite", "name": "Shop"},
                {"@type": "Product", "name": "Graph Tee",
                 "offers": {"price": "19.00"}}
             ]}
            </script>
        "#;
        let product = extract_jsonld_product(html).unwrap();
        assert_eq!(product.name.as_deref(), Some("Graph Tee"));
        assert_eq!(product.price.as_deref(), Some("19.00"));
    }

    #[test]
    fn type_array_is_accepted() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": ["Product", "Thing"], "name": "Array Typed"}
            </script>
        "#;
        assert!(extract_jsonld_product(html).is_some());
    }

    #[test]
    fn aggregate_offer_uses_low_price() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "Product", "name": "Range",
             "offers": {"@type": "AggregateOffer",
                        "lowPrice": "25.00", "highPrice": "40.00"}}
            </script>
        "#;
        let product = extract_jsonld_product(html).unwrap();
        assert_eq!(product.price.as_deref(), Some("25.00"));
        assert_eq!(product.original_price.as_deref(), Some("40.00"));
    }

    #[test]
    fn out_of_stock_availability() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "Product", "name": "Gone",
             "offers": {"price": "10.00",
                        "availability": "https://schema.org/OutOfStock"}}
            </script>
        "#;
        let product = extract_jsonld_product(html).unwrap();
        assert_eq!(product.in_stock, Some(false));
    }

    #[test]
    fn meta_tags_prefer_opengraph() {
        let html = r#"
            <html><head>
            <title>Fallback Title</title>
            <meta property="og:title" content="OG Title">
            <meta property="og:image" content="https://cdn.example.com/og.jpg">
            <meta name="description" content="Plain description">
            </head></html>
        "#;
        let meta = extract_meta_tags(html);
        assert_eq!(meta.title.as_deref(), Some("OG Title"));
        assert_eq!(meta.image.as_deref(), Some("https://cdn.example.com/og.jpg"));
        assert_eq!(meta.description.as_deref(), Some("Plain description"));
    }

    #[test]
    fn meta_tags_fall_back_to_title_element() {
        let html = "<html><head><title>Just a Title</title></head></html>";
        let meta = extract_meta_tags(html);
        assert_eq!(meta.title.as_deref(), Some("Just a Title"));
        assert!(meta.image.is_none());
    }
}
