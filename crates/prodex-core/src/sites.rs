//! Per-site extraction descriptors.
//!
//! The extraction engine is data-driven: each supported retailer contributes
//! a declarative [`SiteDescriptor`] (hostname patterns, fallback brand label,
//! ordered CSS-selector candidates per field) rather than hand-written code.
//! Descriptors are loaded from a YAML file (`config/sites.yaml` by default)
//! and validated at startup.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Ordered candidate selectors for one product field.
///
/// Within each list, the first selector that yields a non-empty value wins.
/// Empty lists are valid — the field simply falls through to the next
/// extraction strategy (structured data, then meta tags).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub name: Vec<String>,
    pub brand: Vec<String>,
    pub price: Vec<String>,
    pub original_price: Vec<String>,
    pub description: Vec<String>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub sku: Vec<String>,
    pub availability: Vec<String>,
    pub material: Vec<String>,
}

/// Declarative description of one retailer the service can extract from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDescriptor {
    /// Stable handler identifier, e.g. `"amazon"`.
    pub id: String,
    /// Hostname substrings matched case-insensitively, in order. Alternatives
    /// for the same retailer (`"saksfifthavenue."`, `"saks."`) are separate
    /// entries, not nested patterns.
    pub host_patterns: Vec<String>,
    /// Brand label used when no brand can be extracted from the page.
    pub brand_fallback: String,
    /// Origin used to absolutize root-relative image URLs.
    pub base_url: String,
    /// Whether the product page is client-rendered and needs a headless
    /// browser to produce meaningful HTML.
    #[serde(default)]
    pub requires_browser: bool,
    /// Optional category hint asserted by the site (passed to the category
    /// detector as-is).
    #[serde(default)]
    pub category_hint: Option<String>,
    #[serde(default)]
    pub selectors: FieldSelectors,
}

/// The full sites file: retailer descriptors plus the two static host lists
/// consulted after the descriptor table fails to match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteDescriptor>,
    /// Hostnames known to run on the Shopify platform without a dedicated
    /// descriptor. Exact substring match.
    #[serde(default)]
    pub shopify_hosts: Vec<String>,
    /// Affiliate/link-shortener hosts that are never terminal product pages.
    #[serde(default)]
    pub redirect_hosts: Vec<String>,
}

/// Load and validate the sites configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sites_file: SitesFile = serde_yaml::from_str(&content)?;

    validate_sites(&sites_file)?;

    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for site in &sites_file.sites {
        if site.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site id must be non-empty".to_string(),
            ));
        }

        let lower_id = site.id.to_lowercase();
        if !seen_ids.insert(lower_id) {
            return Err(ConfigError::Validation(format!(
                "duplicate site id: '{}'",
                site.id
            )));
        }

        if site.host_patterns.is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has no host_patterns",
                site.id
            )));
        }

        if site.host_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty host pattern",
                site.id
            )));
        }

        if site.brand_fallback.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty brand_fallback",
                site.id
            )));
        }

        if !site.base_url.starts_with("http://") && !site.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "site '{}' base_url must be an absolute origin, got '{}'",
                site.id, site.base_url
            )));
        }
    }

    for host in sites_file
        .shopify_hosts
        .iter()
        .chain(&sites_file.redirect_hosts)
    {
        if host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "shopify_hosts/redirect_hosts entries must be non-empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str) -> SiteDescriptor {
        SiteDescriptor {
            id: id.to_string(),
            host_patterns: vec![format!("{id}.")],
            brand_fallback: id.to_string(),
            base_url: format!("https://www.{id}.com"),
            requires_browser: false,
            category_hint: None,
            selectors: FieldSelectors::default(),
        }
    }

    #[test]
    fn valid_sites_pass_validation() {
        let file = SitesFile {
            sites: vec![descriptor("amazon"), descriptor("zara")],
            shopify_hosts: vec!["allbirds.com".to_string()],
            redirect_hosts: vec!["bit.ly".to_string()],
        };
        assert!(validate_sites(&file).is_ok());
    }

    #[test]
    fn duplicate_ids_rejected_case_insensitively() {
        let mut dup = descriptor("amazon");
        dup.id = "Amazon".to_string();
        let file = SitesFile {
            sites: vec![descriptor("amazon"), dup],
            ..SitesFile::default()
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn empty_host_patterns_rejected() {
        let mut site = descriptor("zara");
        site.host_patterns.clear();
        let file = SitesFile {
            sites: vec![site],
            ..SitesFile::default()
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("host_patterns")));
    }

    #[test]
    fn relative_base_url_rejected() {
        let mut site = descriptor("zara");
        site.base_url = "www.zara.com".to_string();
        let file = SitesFile {
            sites: vec![site],
            ..SitesFile::default()
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("base_url")));
    }

    #[test]
    fn sites_file_parses_from_yaml() {
        let yaml = r##"
sites:
  - id: amazon
    host_patterns: ["amazon."]
    brand_fallback: "Amazon"
    base_url: "https://www.amazon.com"
    selectors:
      name: ["#productTitle"]
      price: ["span.a-price span.a-offscreen"]
  - id: saks
    host_patterns: ["saksfifthavenue.", "saks."]
    brand_fallback: "Saks Fifth Avenue"
    base_url: "https://www.saksfifthavenue.com"
    requires_browser: true
shopify_hosts:
  - allbirds.com
redirect_hosts:
  - bit.ly
  - go.shopmy.us
"##;
        let file: SitesFile = serde_yaml::from_str(yaml).unwrap();
        assert!(validate_sites(&file).is_ok());
        assert_eq!(file.sites.len(), 2);
        assert_eq!(file.sites[0].selectors.name, vec!["#productTitle"]);
        assert!(file.sites[1].requires_browser);
        assert_eq!(file.redirect_hosts.len(), 2);
    }
}
