//! CSS selector tables for catalog listing pages.
//!
//! Each logical field maps to an ordered list of selector expressions. Three
//! tiers are consulted in order: the current markup (`primary`), legacy and
//! A/B-test markup (`backup`), and broad attribute-based matches (`generic`).
//! Update the defaults here when the storefront changes its HTML.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical fields that selectors can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Listing container (one per product)
    Card,
    /// Product name
    Name,
    /// Current selling price
    Price,
    /// Struck-through price before discount
    OriginalPrice,
    /// Rating or review count
    Rating,
    /// Seller name or promotional tag line
    TagLine,
    /// Ship-from location or "N sold" slot
    Location,
    /// Product detail link
    Link,
    /// "Next page" pagination control
    NextButton,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 9] = [
        Field::Card,
        Field::Name,
        Field::Price,
        Field::OriginalPrice,
        Field::Rating,
        Field::TagLine,
        Field::Location,
        Field::Link,
        Field::NextButton,
    ];

    /// Config key for this field.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Name => "name",
            Self::Price => "price",
            Self::OriginalPrice => "original_price",
            Self::Rating => "rating",
            Self::TagLine => "tag_line",
            Self::Location => "location",
            Self::Link => "link",
            Self::NextButton => "next_button",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered selector candidates per field for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTable {
    pub card: Vec<String>,
    pub name: Vec<String>,
    pub price: Vec<String>,
    pub original_price: Vec<String>,
    pub rating: Vec<String>,
    pub tag_line: Vec<String>,
    pub location: Vec<String>,
    pub link: Vec<String>,
    pub next_button: Vec<String>,
}

impl SelectorTable {
    /// Candidates for `field`, in priority order.
    #[must_use]
    pub fn get(&self, field: Field) -> &[String] {
        match field {
            Field::Card => &self.card,
            Field::Name => &self.name,
            Field::Price => &self.price,
            Field::OriginalPrice => &self.original_price,
            Field::Rating => &self.rating,
            Field::TagLine => &self.tag_line,
            Field::Location => &self.location,
            Field::Link => &self.link,
            Field::NextButton => &self.next_button,
        }
    }

    /// Current catalog markup.
    #[must_use]
    pub fn default_primary() -> Self {
        Self {
            card: strings(&[r#"[data-qa-locator="product-item"], .gridItem--Yd0sa"#]),
            name: strings(&[
                r#"[data-qa-locator="product-name"], .title--wFj93, .titleText--f74c8"#,
                ".RfADt, .title--wFj93",
            ]),
            price: strings(&[
                ".ooOxS, .price--NVB62, .currency--GVKjl",
                r#"[data-qa-locator="product-price"], .price--NVB62, .currency--GVKjl"#,
            ]),
            original_price: strings(&[
                "span.pdp-v2-product-price-content-originalPrice-amount, .originPrice--AJxRs",
            ]),
            rating: strings(&[
                r#"[data-qa-locator="product-rating"], .rating--D3lOX .average--iqiEa, .qzqFw .number, .stars-rating .rating-value"#,
            ]),
            tag_line: strings(&[
                r#"a.seller-name-v2__detail-name, [data-qa-locator="seller-name"], .shopName--wEhCK, .seller-name"#,
            ]),
            location: strings(&[
                "span.oa6ri",
                "div._6uN7R span",
                "div.buTCk span",
                r#"div.buTCk div._6uN7R > span.oa6ri, [data-qa-locator="location"], .location--LAzqk, .seller-location"#,
            ]),
            link: strings(&["a[href]"]),
            next_button: strings(&[
                r#"[data-qa-locator="pagination-next"], .ant-pagination-next, .pagination-next"#,
            ]),
        }
    }

    /// Legacy and A/B-test markup.
    #[must_use]
    pub fn default_backup() -> Self {
        Self {
            card: strings(&[".Bm3ON, .gridItem--Yd0sa, .product-item"]),
            name: strings(&[".RfADt a, .title--wFj93, .product-title"]),
            price: strings(&[".ooOxS, .price--NVB62, .current-price"]),
            original_price: strings(&[".originPrice--AJxRs, .was-price, .old-price, .original-price"]),
            rating: strings(&[".qzqFw, .rating--D3lOX, .star-rating"]),
            tag_line: strings(&[".WNoq3, .shopName--wEhCK, .seller-name, .shop-name"]),
            location: Vec::new(),
            link: Vec::new(),
            next_button: strings(&[".ant-pagination-next, .pagination-next-btn"]),
        }
    }

    /// Attribute-based last resorts.
    #[must_use]
    pub fn default_generic() -> Self {
        Self {
            name: strings(&["a[title]"]),
            location: strings(&[
                r#"[class*="location"]"#,
                r#"[class*="shipping"]"#,
                r#"[class*="region"]"#,
                r#"span[class*="ship"]"#,
                r#"div[class*="location"] span"#,
            ]),
            link: strings(&["a"]),
            next_button: strings(&[".ant-pagination-next:not(.ant-pagination-disabled)"]),
            ..Self::default()
        }
    }
}

/// Full selector configuration: three tiers plus popup dismissers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub primary: SelectorTable,
    pub backup: SelectorTable,
    pub generic: SelectorTable,
    /// Cookie banners and promotional dialogs, clicked once after navigation
    pub popups: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            primary: SelectorTable::default_primary(),
            backup: SelectorTable::default_backup(),
            generic: SelectorTable::default_generic(),
            popups: strings(&[
                r#"[data-qa-locator="cookie-accept"]"#,
                r#".mui-dialog-close, .close-btn, [data-qa-locator="popup-close"]"#,
            ]),
        }
    }
}

impl SelectorConfig {
    /// All candidates for `field` across tiers: primary, backup, then generic.
    pub fn chain(&self, field: Field) -> impl Iterator<Item = &str> {
        self.primary
            .get(field)
            .iter()
            .chain(self.backup.get(field))
            .chain(self.generic.get(field))
            .map(String::as_str)
    }

    /// Primary and backup card selectors joined into one group.
    ///
    /// Used when counting listings regardless of which markup is live.
    #[must_use]
    pub fn any_card(&self) -> String {
        self.primary
            .card
            .iter()
            .chain(&self.backup.card)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
