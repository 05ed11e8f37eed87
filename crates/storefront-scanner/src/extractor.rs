use crate::selectors::ListingSelectors;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::ElementRef;
use storefront_core::text::{normalize_text, parse_number, parse_price};
use storefront_core::{CatalogTables, ListingRecord, Placement, RecordParts};
use url::Url;

/// Words that mark the free-text line under a price as location or sales.
const PLACEMENT_INDICATORS: [&str; 4] = ["singapore", "overseas", "local", "sold"];

static SAVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsave\s*(?:S\$|\$|\bRM|₱|฿)?\s*(\d[\d.,]*)\s*(%)?").expect("valid regex")
});

static AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:S\$|\$|\bRM|₱|฿)\s*(\d[\d.,]*)").expect("valid regex"));

/// Turns one listing element into a [`ListingRecord`].
pub struct FieldExtractor<'a> {
    selectors: &'a ListingSelectors,
    catalog: &'a CatalogTables,
    base_url: Url,
    category: String,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(
        selectors: &'a ListingSelectors,
        catalog: &'a CatalogTables,
        base_url: Url,
        category: impl Into<String>,
    ) -> Self {
        Self {
            selectors,
            catalog,
            base_url,
            category: category.into(),
        }
    }

    /// Extract a record, or `None` when no name can be found.
    ///
    /// Every other field degrades to its default.
    pub fn extract(&self, element: &ElementRef<'_>) -> Option<ListingRecord> {
        let raw_name = self.selectors.name.first_text_or_attr(element, "title")?;
        let name = normalize_text(&raw_name);
        if name.is_empty() {
            return None;
        }

        let price = self
            .selectors
            .price
            .first_text(element)
            .map_or(0.0, |text| parse_price(&text));

        let raw_tag_line = self.selectors.tag_line.first_text(element).unwrap_or_default();

        let original_price = self
            .selectors
            .original_price
            .first_text(element)
            .and_then(|text| parse_number(&text))
            .filter(|value| *value > 0.0)
            .or_else(|| original_from_tag_line(&raw_tag_line, price));

        let tag_line = normalize_text(&raw_tag_line);

        let popularity = self
            .selectors
            .rating
            .first_text(element)
            .and_then(|text| parse_number(&text))
            .unwrap_or(0.0);

        let url = self
            .selectors
            .link
            .first_attr(element, "href")
            .and_then(|href| self.base_url.join(&href).ok())
            .map(String::from);

        let placement = self
            .selectors
            .location
            .first_text(element)
            .or_else(|| scan_placement_line(element))
            .map(|text| normalize_text(&text))
            .filter(|text| !text.is_empty())
            .map(Placement::classify);

        let brand = self.catalog.infer_brand(&raw_name, &self.category);

        let record = ListingRecord::from_parts(RecordParts {
            name,
            price,
            original_price,
            popularity,
            tag_line,
            url,
            brand,
            placement,
            category: self.category.clone(),
        });

        if let Some(record) = &record {
            tracing::trace!(
                name = record.name(),
                price = record.price(),
                discount = record.discount_percentage(),
                "extracted listing"
            );
        }
        record
    }
}

/// Recover an original price from raw promotional text.
///
/// "Save S$20" means the original was `current + 20`, and a bare currency
/// amount is taken as the saving when no "save" phrase is present. A
/// percentage saving recovers nothing.
fn original_from_tag_line(tag_line: &str, current: f64) -> Option<f64> {
    if tag_line.is_empty() || current <= 0.0 {
        return None;
    }

    let amount = |caps: &Captures<'_>| parse_number(&caps[1]).filter(|v| *v > 0.0);

    if let Some(caps) = SAVE.captures(tag_line) {
        if caps.get(2).is_some() {
            return None;
        }
        return amount(&caps).map(|saving| current + saving);
    }

    AMOUNT
        .captures(tag_line)
        .and_then(|caps| amount(&caps))
        .map(|saving| current + saving)
}

/// Scan an element's text for a location or sales marker.
///
/// Indicators are tried in priority order, so a location line wins over an
/// earlier "sold" line.
fn scan_placement_line(element: &ElementRef<'_>) -> Option<String> {
    let lines: Vec<&str> = element
        .text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    PLACEMENT_INDICATORS.iter().find_map(|indicator| {
        lines
            .iter()
            .find(|line| line.to_lowercase().contains(indicator))
            .map(|line| (*line).to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};
    use storefront_core::SelectorConfig;

    fn selectors() -> ListingSelectors {
        ListingSelectors::compile(&SelectorConfig::default()).unwrap()
    }

    fn extract_first(html: &str, category: &str) -> Option<ListingRecord> {
        let selectors = selectors();
        let catalog = CatalogTables::default();
        let extractor = FieldExtractor::new(
            &selectors,
            &catalog,
            Url::parse("https://www.lazada.sg").unwrap(),
            category,
        );
        let document = Html::parse_document(html);
        let card = Selector::parse(r#"[data-qa-locator="product-item"]"#).unwrap();
        let element = document.select(&card).next().expect("fixture has a card");
        extractor.extract(&element)
    }

    #[test]
    fn test_extracts_primary_markup() {
        let html = r#"
            <div data-qa-locator="product-item">
                <a href="//www.lazada.sg/products/sony-wh-1000xm5-i123.html">
                    <div class="RfADt">Sony   WH-1000XM5 Wireless Headphones</div>
                </a>
                <span class="ooOxS">S$1,299.50</span>
                <span class="originPrice--AJxRs">S$1,499.50</span>
                <div class="qzqFw"><span class="number">(1,204)</span></div>
                <span class="oa6ri">Singapore</span>
            </div>
        "#;

        let record = extract_first(html, "electronics").expect("named listing");
        assert_eq!(record.name(), "Sony WH-1000XM5 Wireless Headphones");
        assert!((record.price() - 1299.50).abs() < f64::EPSILON);
        assert!((record.discount_percentage() - 13.34).abs() < f64::EPSILON);
        assert!((record.popularity() - 1204.0).abs() < f64::EPSILON);
        assert_eq!(
            record.url(),
            Some("https://www.lazada.sg/products/sony-wh-1000xm5-i123.html")
        );
        assert_eq!(record.brand(), "Sony");
        assert_eq!(record.location(), Some("Singapore"));
        assert_eq!(record.quantity_sold(), None);
        assert_eq!(record.category(), "electronics");
    }

    #[test]
    fn test_missing_name_discards_record() {
        let html = r#"
            <div data-qa-locator="product-item">
                <span class="ooOxS">S$12.00</span>
            </div>
        "#;
        assert!(extract_first(html, "electronics").is_none());
    }

    #[test]
    fn test_title_attribute_supplies_name() {
        let html = r#"
            <div data-qa-locator="product-item">
                <a href="/products/kettle-i9.html" title="ZENBREW Electric Kettle"><img src="k.jpg"></a>
                <span class="ooOxS">S$39.90</span>
            </div>
        "#;
        let record = extract_first(html, "home-living").expect("named listing");
        assert_eq!(record.name(), "ZENBREW Electric Kettle");
        assert_eq!(record.brand(), "Zenbrew");
        assert_eq!(record.url(), Some("https://www.lazada.sg/products/kettle-i9.html"));
    }

    #[test]
    fn test_sold_counter_fills_quantity_only() {
        let html = r#"
            <div data-qa-locator="product-item">
                <div class="RfADt">Xiaomi Redmi Note 13</div>
                <span class="ooOxS">S$249</span>
                <span class="oa6ri">120 sold</span>
            </div>
        "#;
        let record = extract_first(html, "mobiles-tablets").expect("named listing");
        assert_eq!(record.quantity_sold(), Some("120 sold"));
        assert_eq!(record.location(), None);
        assert_eq!(record.brand(), "Xiaomi");
    }

    #[test]
    fn test_placement_found_by_line_scan() {
        let html = r#"
            <div data-qa-locator="product-item">
                <div class="RfADt">Garmin Forerunner 265</div>
                <span class="ooOxS">S$499</span>
                <div class="footer"><em>Free shipping</em><em>Overseas</em></div>
            </div>
        "#;
        let record = extract_first(html, "watches-accessories").expect("named listing");
        assert_eq!(record.location(), Some("Overseas"));
        assert_eq!(record.brand(), "Garmin");
    }

    #[test]
    fn test_unparsable_price_is_zero() {
        let html = r#"
            <div data-qa-locator="product-item">
                <div class="RfADt">Mystery Box</div>
                <span class="ooOxS">Price on request</span>
            </div>
        "#;
        let record = extract_first(html, "electronics").expect("named listing");
        assert!(record.price().abs() < f64::EPSILON);
        assert!(record.discount_percentage().abs() < f64::EPSILON);
        assert!(record.popularity().abs() < f64::EPSILON);
        assert_eq!(record.url(), None);
    }

    #[test]
    fn test_original_from_tag_line() {
        assert_eq!(original_from_tag_line("Save S$20 today", 80.0), Some(100.0));
        assert_eq!(original_from_tag_line("Voucher $5 off", 45.0), Some(50.0));
        assert_eq!(original_from_tag_line("save 20%", 80.0), None);
        assert_eq!(original_from_tag_line("PLATFORM 8 STORE", 80.0), None);
        assert_eq!(original_from_tag_line("RM 5 off", 45.0), Some(50.0));
        assert_eq!(original_from_tag_line("Official Store", 80.0), None);
        assert_eq!(original_from_tag_line("Save S$20", 0.0), None);
    }

    #[test]
    fn test_save_phrase_takes_precedence() {
        // The "save" amount wins over an earlier currency figure
        assert_eq!(original_from_tag_line("Min spend $50, save $10", 90.0), Some(100.0));
    }

    #[test]
    fn test_tag_line_saving_sets_discount() {
        let html = r#"
            <div data-qa-locator="product-item">
                <div class="RfADt">Anker Soundcore Motion 300</div>
                <span class="ooOxS">S$80</span>
                <span class="seller-name">Save S$20 today</span>
            </div>
        "#;
        let record = extract_first(html, "electronics").expect("named listing");
        assert!((record.discount_percentage() - 20.0).abs() < f64::EPSILON);
        assert_eq!(record.tag_line(), "Save S20 today");
    }

    #[test]
    fn test_location_line_wins_over_earlier_sold_line() {
        let html = r#"
            <div data-qa-locator="product-item">
                <div class="RfADt">Logitech MX Master 3S</div>
                <span class="ooOxS">S$139</span>
                <div class="footer"><em>120 sold</em><em>Singapore</em></div>
            </div>
        "#;
        let record = extract_first(html, "electronics").expect("named listing");
        assert_eq!(record.location(), Some("Singapore"));
        assert_eq!(record.quantity_sold(), None);
    }
}
