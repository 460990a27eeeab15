//! Shopify storefront extraction: the JSON endpoint and the dynamic platform check.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prodex_core::{KeywordCategoryDetector, SitesFile};
use prodex_scraper::classify::SiteTable;
use prodex_scraper::fetch::{FetchClient, FetchConfig};
use prodex_scraper::router::ProductScraper;

fn scraper(shopify_hosts: Vec<String>) -> ProductScraper {
    let table = SiteTable::from_sites_file(SitesFile {
        sites: vec![],
        shopify_hosts,
        redirect_hosts: vec![],
    });
    let http = FetchClient::new(&FetchConfig {
        timeout_secs: 5,
        max_retries: 0,
        backoff_base_ms: 10,
        ..FetchConfig::default()
    })
    .expect("client builds");
    ProductScraper::new(
        http,
        None,
        table,
        Arc::new(KeywordCategoryDetector::default()),
    )
}

fn product_json() -> serde_json::Value {
    json!({
        "product": {
            "title": "Trail Runner",
            "vendor": "Allgood",
            "body_html": "<p>A <b>grippy</b> trail shoe.</p>",
            "product_type": "Shoes",
            "variants": [
                {"price": "98.00", "compare_at_price": "120.00", "sku": "TR-001", "available": true},
                {"price": "98.00", "compare_at_price": null, "sku": "TR-002", "available": false}
            ],
            "images": [{"src": "https://cdn.shopify.com/s/files/trail.jpg"}],
            "options": [
                {"name": "Size", "values": ["8", "9", "10"]},
                {"name": "Color", "values": ["Moss", "Slate"]}
            ]
        }
    })
}

#[tokio::test]
async fn allow_listed_host_uses_the_json_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/trail-runner.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json()))
        .mount(&server)
        .await;

    let url = format!("{}/products/trail-runner", server.uri());
    let outcome = scraper(vec!["127.0.0.1".to_string()]).scrape(&url).await;

    assert!(outcome.success);
    let product = outcome.product.expect("product present");
    assert_eq!(product["name"], "Trail Runner");
    assert_eq!(product["brand"], "Allgood");
    assert!((product["price"].as_f64().unwrap() - 98.0).abs() < 1e-9);
    assert!((product["originalPrice"].as_f64().unwrap() - 120.0).abs() < 1e-9);
    assert_eq!(product["isOnSale"], true);
    assert_eq!(product["sizes"], json!(["8", "9", "10"]));
    assert_eq!(product["color"], "Moss");
    assert_eq!(product["sku"], "TR-001");
    // Any available variant means in stock.
    assert_eq!(product["in_stock"], true);
    // body_html arrives as plain text.
    assert_eq!(product["description"], "A grippy trail shoe.");
    assert_eq!(product["category"], "shoes");
}

#[tokio::test]
async fn unlisted_host_is_recognized_and_upgraded_to_the_json_endpoint() {
    let server = MockServer::start().await;
    let page = r#"<html><head>
        <script src="https://cdn.shopify.com/s/assets/theme.js"></script>
    </head><body><h1>Trail Runner</h1></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/products/trail-runner"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/trail-runner.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json()))
        .mount(&server)
        .await;

    // No allow-list entry: classification is generic, the signature check does the rest.
    let url = format!("{}/products/trail-runner", server.uri());
    let outcome = scraper(vec![]).scrape(&url).await;

    assert!(outcome.success);
    let product = outcome.product.expect("product present");
    assert_eq!(product["brand"], "Allgood");
    assert!((product["originalPrice"].as_f64().unwrap() - 120.0).abs() < 1e-9);
}

#[tokio::test]
async fn broken_json_endpoint_falls_back_to_page_extraction() {
    let server = MockServer::start().await;
    let page = r#"<html><body>
        <h1>Trail Runner</h1>
        <span class="price">$98.00</span>
    </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/products/trail-runner"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;
    // Store has the endpoint disabled; it answers with an HTML error page.
    Mock::given(method("GET"))
        .and(path("/products/trail-runner.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let url = format!("{}/products/trail-runner", server.uri());
    let outcome = scraper(vec!["127.0.0.1".to_string()]).scrape(&url).await;

    assert!(outcome.success);
    let product = outcome.product.expect("product present");
    assert_eq!(product["name"], "Trail Runner");
    assert!((product["price"].as_f64().unwrap() - 98.0).abs() < 1e-9);
}

#[tokio::test]
async fn non_product_path_on_shopify_host_uses_page_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>All products</h1></body></html>"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/collections/all", server.uri());
    let outcome = scraper(vec!["127.0.0.1".to_string()]).scrape(&url).await;

    // A collection page has a heading but no price; name alone is usable.
    assert!(outcome.success);
    assert_eq!(outcome.product.expect("record")["name"], "All products");
}
