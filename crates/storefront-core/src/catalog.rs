//! Static catalog tables: category landing URLs, brand lists and category keywords.
//!
//! These are read-only during a scrape. Brand lists are ordered because the
//! first matching brand wins when a name mentions more than one.

use crate::text::title_case;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Brands commonly sold under one category key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandList {
    /// Category key, e.g. `mobiles-tablets`
    pub category: String,
    /// Lowercase brand names, matched as substrings
    pub brands: Vec<String>,
}

/// Category and brand tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogTables {
    /// Fixed landing page per category key
    pub category_urls: BTreeMap<String, String>,
    /// Brand lists per category, in priority order
    pub brands: Vec<BrandList>,
    /// Name keywords typical of each category
    pub category_keywords: BTreeMap<String, Vec<String>>,
}

impl CatalogTables {
    /// Known landing URL for a category key (case-insensitive).
    #[must_use]
    pub fn category_url(&self, category: &str) -> Option<&str> {
        self.category_urls
            .get(&category.to_lowercase())
            .map(String::as_str)
    }

    /// Brand list for a category key, empty if unknown.
    #[must_use]
    pub fn brands_for(&self, category: &str) -> &[String] {
        let category = category.to_lowercase();
        self.brands
            .iter()
            .find(|list| list.category == category)
            .map(|list| list.brands.as_slice())
            .unwrap_or_default()
    }

    /// Keyword list for a category key, empty if unknown.
    #[must_use]
    pub fn keywords_for(&self, category: &str) -> &[String] {
        self.category_keywords
            .get(&category.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Infer a brand from a product name.
    ///
    /// The active category's list is scanned first, then every list in
    /// order. Without a match the first word of the name is used.
    #[must_use]
    pub fn infer_brand(&self, name: &str, category: &str) -> String {
        let name_lower = name.to_lowercase();
        let matches = |brand: &&String| name_lower.contains(brand.to_lowercase().as_str());

        if let Some(brand) = self.brands_for(category).iter().find(matches) {
            return title_case(brand);
        }

        if let Some(brand) = self
            .brands
            .iter()
            .flat_map(|list| list.brands.iter())
            .find(matches)
        {
            return title_case(brand);
        }

        name.split_whitespace()
            .next()
            .map_or_else(|| "Unknown".to_string(), title_case)
    }
}

impl Default for CatalogTables {
    fn default() -> Self {
        let category_urls = [
            ("electronics", "https://www.lazada.sg/shop-electronics/"),
            ("mobiles-tablets", "https://www.lazada.sg/shop-mobiles-tablets/"),
            (
                "computers-laptops",
                "https://www.lazada.sg/catalog/?q=Laptops&from=hp_categories&src=all_channel",
            ),
            ("home-living", "https://www.lazada.sg/shop-home-living/"),
            ("health-beauty", "https://www.lazada.sg/shop-health-beauty/"),
            (
                "babies-toys",
                "https://www.lazada.sg/catalog/?q=Toys%20%26%20Games&from=hp_categories&src=all_channel",
            ),
            (
                "groceries",
                "https://www.lazada.sg/tag/groceries/?q=groceries&catalog_redirect_tag=true",
            ),
            (
                "fashion-women",
                "https://www.lazada.sg/tag/women-fashion/?q=women%20fashion&catalog_redirect_tag=true",
            ),
            (
                "fashion-men",
                "https://www.lazada.sg/tag/men-fashion/?q=men%20fashion&catalog_redirect_tag=true",
            ),
            (
                "watches-accessories",
                "https://www.lazada.sg/tag/watch-accessories/?q=watch%20accessories&catalog_redirect_tag=true",
            ),
            (
                "home-fitness-equipment",
                "https://www.lazada.sg/shop-home-fitness-equipment/",
            ),
            ("automotive", "https://www.lazada.sg/shop-automotive/"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let brands = [
            (
                "electronics",
                &[
                    "sony", "samsung", "lg", "panasonic", "philips", "sharp", "toshiba", "pioneer",
                    "jbl", "bose", "beats", "audio-technica", "sennheiser",
                ][..],
            ),
            (
                "mobiles-tablets",
                &[
                    "apple", "iphone", "samsung", "galaxy", "huawei", "xiaomi", "redmi", "oppo",
                    "vivo", "oneplus", "google", "pixel", "sony", "lg", "motorola", "nokia",
                    "realme", "honor", "asus", "poco", "blackberry", "tcl", "infinix", "tecno",
                    "nothing", "fairphone",
                ][..],
            ),
            (
                "computers-laptops",
                &[
                    "dell", "hp", "lenovo", "asus", "acer", "apple", "macbook", "msi", "alienware",
                    "razer", "surface", "microsoft", "gigabyte", "intel", "amd",
                ][..],
            ),
            (
                "fashion-women",
                &[
                    "nike", "adidas", "zara", "h&m", "uniqlo", "forever21", "mango",
                    "charles & keith", "coach", "michael kors", "kate spade", "tory burch",
                ][..],
            ),
            (
                "fashion-men",
                &[
                    "nike", "adidas", "polo ralph lauren", "tommy hilfiger", "calvin klein",
                    "levi's", "uniqlo", "h&m", "zara", "boss", "armani", "lacoste",
                ][..],
            ),
            (
                "health-beauty",
                &[
                    "olay", "neutrogena", "l'oreal", "maybelline", "revlon", "clinique",
                    "estee lauder", "lancome", "shiseido", "sk-ii", "the ordinary", "cerave",
                    "innisfree",
                ][..],
            ),
            (
                "watches-accessories",
                &[
                    "rolex", "omega", "tag heuer", "tissot", "seiko", "citizen", "casio",
                    "apple watch", "samsung gear", "fitbit", "garmin", "fossil",
                    "daniel wellington",
                ][..],
            ),
            (
                "sports-outdoor",
                &[
                    "nike", "adidas", "under armour", "puma", "reebok", "new balance", "asics",
                    "mizuno", "yonex", "wilson", "spalding", "coleman", "the north face",
                ][..],
            ),
        ]
        .into_iter()
        .map(|(category, brands)| BrandList {
            category: category.to_string(),
            brands: brands.iter().map(|b| (*b).to_string()).collect(),
        })
        .collect();

        let category_keywords = [
            (
                "electronics",
                &["tv", "television", "speaker", "headphone", "camera", "audio", "video"][..],
            ),
            (
                "mobiles-tablets",
                &["smartphone", "phone", "mobile", "tablet", "ipad", "android", "ios"][..],
            ),
            (
                "computers-laptops",
                &["laptop", "computer", "desktop", "notebook", "pc", "workstation"][..],
            ),
            (
                "fashion-women",
                &["dress", "top", "blouse", "skirt", "pants", "jeans", "shoes", "bag"][..],
            ),
            (
                "fashion-men",
                &["shirt", "polo", "t-shirt", "pants", "jeans", "shoes", "watch", "wallet"][..],
            ),
            (
                "health-beauty",
                &["skincare", "makeup", "cosmetic", "cream", "serum", "cleanser", "moisturizer"][..],
            ),
            (
                "watches-accessories",
                &["watch", "bracelet", "necklace", "ring", "earring", "sunglasses"][..],
            ),
            (
                "sports-outdoor",
                &["running", "fitness", "gym", "outdoor", "sports", "exercise", "training"][..],
            ),
        ]
        .into_iter()
        .map(|(category, words)| {
            (
                category.to_string(),
                words.iter().map(|w| (*w).to_string()).collect(),
            )
        })
        .collect();

        Self {
            category_urls,
            brands,
            category_keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_url_lookup_is_case_insensitive() {
        let tables = CatalogTables::default();
        assert_eq!(
            tables.category_url("Electronics"),
            Some("https://www.lazada.sg/shop-electronics/")
        );
        assert_eq!(tables.category_url("gadgets"), None);
    }

    #[test]
    fn test_infer_brand_prefers_active_category() {
        let tables = CatalogTables::default();
        let name = "Galaxy Buds with Sony adapter";
        assert_eq!(tables.infer_brand(name, "mobiles-tablets"), "Galaxy");
        // Without a category list the electronics list is consulted first
        assert_eq!(tables.infer_brand(name, "gadgets"), "Sony");
        assert_eq!(tables.infer_brand("Xiaomi Redmi Note 13", "mobiles-tablets"), "Xiaomi");
    }

    #[test]
    fn test_infer_brand_falls_back_to_all_lists() {
        let tables = CatalogTables::default();
        assert_eq!(tables.infer_brand("Garmin Forerunner 265", "electronics"), "Garmin");
        assert_eq!(
            tables.infer_brand("AUDIO-TECHNICA ATH-M50x", "gadgets"),
            "Audio-Technica"
        );
    }

    #[test]
    fn test_infer_brand_first_word_fallback() {
        let tables = CatalogTables::default();
        assert_eq!(tables.infer_brand("ZENBREW cold brew kit", "groceries"), "Zenbrew");
    }

    #[test]
    fn test_keywords_for_unknown_category_is_empty() {
        let tables = CatalogTables::default();
        assert!(tables.keywords_for("gadgets").is_empty());
        assert!(tables.keywords_for("computers-laptops").contains(&"laptop".to_string()));
    }
}
