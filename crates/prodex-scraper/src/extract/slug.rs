//! Slug-to-title salvage for blocked fetches.
//!
//! When a site's bot protection refuses us, the URL path itself is often the
//! only data available. `title_from_slug` turns the last meaningful path
//! segment into a display name so a degraded record still shows something.

/// Derives a title-cased product name from the URL's last path segment.
///
/// Returns `None` when the path has no usable segment (bare origin, numeric
/// IDs only).
pub(crate) fn title_from_slug(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .filter(|s| !is_noise_segment(s))
        .next_back()?;

    // Strip a file extension and a trailing numeric ID chunk ("-12345").
    let segment = segment.split('.').next().unwrap_or(segment);
    let words: Vec<String> = segment
        .split(['-', '_', '+'])
        .filter(|w| !w.is_empty())
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .map(title_case_word)
        .collect();

    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

/// Path segments that are routing noise, not product slugs.
fn is_noise_segment(segment: &str) -> bool {
    matches!(
        segment.to_lowercase().as_str(),
        "p" | "dp" | "product" | "products" | "item" | "itm" | "en" | "us" | "shop"
    ) || segment.chars().all(|c| c.is_ascii_digit())
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphenated_slug_becomes_title() {
        assert_eq!(
            title_from_slug("https://www.zara.com/us/en/ribbed-knit-sweater-p01234.html").as_deref(),
            Some("Ribbed Knit Sweater P01234")
        );
    }

    #[test]
    fn skips_noise_and_numeric_segments() {
        assert_eq!(
            title_from_slug("https://shop.example.com/products/linen-shirt/123456").as_deref(),
            Some("Linen Shirt")
        );
    }

    #[test]
    fn numeric_only_words_dropped() {
        assert_eq!(
            title_from_slug("https://x.com/item/leather-tote-98765").as_deref(),
            Some("Leather Tote")
        );
    }

    #[test]
    fn bare_origin_yields_nothing() {
        assert_eq!(title_from_slug("https://www.example.com/"), None);
    }

    #[test]
    fn underscores_treated_as_separators() {
        assert_eq!(
            title_from_slug("https://x.com/p/wide_leg_jeans").as_deref(),
            Some("Wide Leg Jeans")
        );
    }
}
