//! Product category detection.
//!
//! The extraction pipeline treats category labels as opaque: it hands the
//! detector whatever text it has (name, description, brand, an optional
//! site-asserted hint) and passes the returned label through unchanged.
//! The trait is the seam — callers take `&dyn CategoryDetect` so tests can
//! substitute a fake without touching module state.

/// Collaborator that maps product text to a category label.
pub trait CategoryDetect {
    fn detect(&self, name: &str, description: &str, brand: &str, hint: Option<&str>) -> String;
}

/// Keyword-table category classifier.
///
/// Checks the site hint first, then the product name, then the description.
/// The first table row whose keywords match wins; table order is the
/// tie-break policy (more specific categories come first).
pub struct KeywordCategoryDetector {
    table: Vec<(&'static str, Vec<&'static str>)>,
}

impl Default for KeywordCategoryDetector {
    fn default() -> Self {
        Self {
            table: vec![
                (
                    "shoes",
                    vec![
                        "sneaker", "shoe", "boot", "loafer", "sandal", "heel", "trainer",
                    ],
                ),
                (
                    "bags",
                    vec!["bag", "tote", "backpack", "clutch", "handbag", "wallet"],
                ),
                (
                    "jewelry",
                    vec!["necklace", "bracelet", "earring", "ring", "pendant"],
                ),
                (
                    "outerwear",
                    vec!["jacket", "coat", "parka", "blazer", "vest"],
                ),
                (
                    "dresses",
                    vec!["dress", "gown", "midi", "maxi"],
                ),
                (
                    "tops",
                    vec![
                        "shirt", "t-shirt", "tee", "blouse", "sweater", "hoodie", "cardigan",
                        "top",
                    ],
                ),
                (
                    "bottoms",
                    vec!["jeans", "pants", "trousers", "shorts", "skirt", "leggings"],
                ),
                (
                    "beauty",
                    vec![
                        "serum", "moisturizer", "lipstick", "mascara", "fragrance", "perfume",
                        "skincare",
                    ],
                ),
                (
                    "accessories",
                    vec!["belt", "scarf", "hat", "sunglasses", "gloves", "watch"],
                ),
            ],
        }
    }
}

impl KeywordCategoryDetector {
    fn match_text(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        for (category, keywords) in &self.table {
            if keywords.iter().any(|kw| lower.contains(kw)) {
                return Some((*category).to_string());
            }
        }
        None
    }
}

impl CategoryDetect for KeywordCategoryDetector {
    fn detect(&self, name: &str, description: &str, _brand: &str, hint: Option<&str>) -> String {
        if let Some(hint) = hint {
            if !hint.trim().is_empty() {
                if let Some(category) = self.match_text(hint) {
                    return category;
                }
            }
        }
        if let Some(category) = self.match_text(name) {
            return category;
        }
        if let Some(category) = self.match_text(description) {
            return category;
        }
        "other".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_from_name() {
        let detector = KeywordCategoryDetector::default();
        assert_eq!(
            detector.detect("Air Max 90 Sneaker", "", "Nike", None),
            "shoes"
        );
    }

    #[test]
    fn hint_takes_precedence_over_name() {
        let detector = KeywordCategoryDetector::default();
        // Name mentions "top" but the site asserts a shoes hint.
        assert_eq!(
            detector.detect("High Top Classic", "", "", Some("running shoes")),
            "shoes"
        );
    }

    #[test]
    fn falls_back_to_description() {
        let detector = KeywordCategoryDetector::default();
        assert_eq!(
            detector.detect("Aurora", "A silk midi dress with pockets", "", None),
            "dresses"
        );
    }

    #[test]
    fn unknown_text_is_other() {
        let detector = KeywordCategoryDetector::default();
        assert_eq!(detector.detect("Gift Card", "", "", None), "other");
    }

    #[test]
    fn empty_hint_is_ignored() {
        let detector = KeywordCategoryDetector::default();
        assert_eq!(detector.detect("Leather tote", "", "", Some("  ")), "bags");
    }

    #[test]
    fn table_order_breaks_ties() {
        let detector = KeywordCategoryDetector::default();
        // "boot" (shoes) appears before "bag" in the table; text mentions both.
        assert_eq!(
            detector.detect("Boot and bag care kit", "", "", None),
            "shoes"
        );
    }
}
