//! Generic DOM heuristics for sites without a dedicated descriptor.
//!
//! These selectors are the common denominators of product-page markup:
//! microdata `itemprop` attributes and the class names ecommerce themes have
//! converged on. They are deliberately conservative — structured data and
//! meta tags do most of the work on unknown sites.

use prodex_core::FieldSelectors;

/// Selector set used by the generic extractor.
pub(crate) fn generic_selectors() -> FieldSelectors {
    FieldSelectors {
        name: vec![
            "[itemprop=\"name\"]".to_string(),
            "h1.product-title".to_string(),
            "h1.product-name".to_string(),
            "h1.product__title".to_string(),
            ".product-single__title".to_string(),
            "h1".to_string(),
        ],
        brand: vec![
            "[itemprop=\"brand\"]".to_string(),
            ".product-brand".to_string(),
            ".product__vendor".to_string(),
        ],
        price: vec![
            "[itemprop=\"price\"]".to_string(),
            "meta[property=\"product:price:amount\"]".to_string(),
            ".price__current".to_string(),
            ".product-price".to_string(),
            ".price-item--sale".to_string(),
            ".price".to_string(),
        ],
        original_price: vec![
            ".price__was".to_string(),
            ".compare-at-price".to_string(),
            ".price-item--regular".to_string(),
            "s.price".to_string(),
            "del".to_string(),
        ],
        description: vec![
            "[itemprop=\"description\"]".to_string(),
            ".product-description".to_string(),
            ".product__description".to_string(),
            "#description".to_string(),
        ],
        images: vec![
            "[itemprop=\"image\"]".to_string(),
            ".product__media img".to_string(),
            ".product-gallery img".to_string(),
            "img[src*=\"/products/\"]".to_string(),
        ],
        sizes: vec![
            "select[name*=\"ize\"] option".to_string(),
            ".size-options button".to_string(),
        ],
        colors: vec![
            "select[name*=\"olor\"] option".to_string(),
            ".color-swatch img".to_string(),
        ],
        sku: vec!["[itemprop=\"sku\"]".to_string(), ".product-sku".to_string()],
        availability: vec![
            "[itemprop=\"availability\"]".to_string(),
            ".stock-status".to_string(),
            ".product-availability".to_string(),
        ],
        material: vec!["[itemprop=\"material\"]".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::dom::extract_dom;

    #[test]
    fn microdata_page_extracts_core_fields() {
        let html = r#"
            <html><body>
              <h1 itemprop="name">Canvas High Top</h1>
              <span itemprop="brand">Converse</span>
              <span itemprop="price" content="65.00">$65.00</span>
              <div itemprop="description">Classic canvas sneaker.</div>
              <img itemprop="image" src="https://cdn.example.com/hightop.jpg">
            </body></html>
        "#;
        let dom = extract_dom(html, &generic_selectors(), "https://unknown-store.io/p/1");
        assert_eq!(dom.name.as_deref(), Some("Canvas High Top"));
        assert_eq!(dom.brand.as_deref(), Some("Converse"));
        // itemprop=price carries a content attribute, preferred over text.
        assert_eq!(dom.price.as_deref(), Some("65.00"));
        assert_eq!(dom.images, vec!["https://cdn.example.com/hightop.jpg"]);
    }

    #[test]
    fn theme_class_names_are_fallbacks() {
        let html = r#"
            <h1 class="product-title">Basic Tee</h1>
            <div class="product-price">$20</div>
        "#;
        let dom = extract_dom(html, &generic_selectors(), "https://unknown-store.io/p/2");
        assert_eq!(dom.name.as_deref(), Some("Basic Tee"));
        assert_eq!(dom.price.as_deref(), Some("$20"));
    }

    #[test]
    fn bare_h1_is_the_last_name_resort() {
        let html = "<h1>Mystery Item</h1>";
        let dom = extract_dom(html, &generic_selectors(), "https://unknown-store.io/p/3");
        assert_eq!(dom.name.as_deref(), Some("Mystery Item"));
    }
}
