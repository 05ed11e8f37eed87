//! Listing record types shared by the scanner and its output collaborators.

use crate::error::StorefrontError;
use crate::text::round2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output columns, in order, for writers that serialize [`ListingRow`]s.
pub const DATA_FIELDS: [&str; 11] = [
    "product_name",
    "price",
    "discount_percentage",
    "review_count",
    "discount_tag_line",
    "product_url",
    "brand",
    "location",
    "quantity_sold",
    "category",
    "scraped_at",
];

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, StorefrontError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| StorefrontError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// The single free-text field under a listing's price.
///
/// Catalog cards reuse one slot for either the ship-from location or a
/// "N sold" counter, so a record carries at most one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Ship-from location, e.g. "Singapore" or "Overseas"
    Location(String),
    /// Sales counter, e.g. "120 sold"
    QuantitySold(String),
}

impl Placement {
    /// Classify raw slot text: anything mentioning "sold" is a sales counter.
    #[must_use]
    pub fn classify(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.to_lowercase().contains("sold") {
            Self::QuantitySold(text)
        } else {
            Self::Location(text)
        }
    }
}

/// Field values gathered from one listing element, before invariants are applied.
#[derive(Debug, Clone, Default)]
pub struct RecordParts {
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub popularity: f64,
    pub tag_line: String,
    pub url: Option<String>,
    pub brand: String,
    pub placement: Option<Placement>,
    pub category: String,
}

/// One scraped product. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    name: String,
    price: f64,
    discount_percentage: f64,
    popularity: f64,
    tag_line: String,
    url: Option<String>,
    brand: String,
    placement: Option<Placement>,
    category: String,
    scraped_at: Timestamp,
}

impl ListingRecord {
    /// Build a record stamped with the current time.
    ///
    /// Returns `None` when the name is blank. Negative or non-finite numbers
    /// are floored to zero and the discount is derived from the original price.
    #[must_use]
    pub fn from_parts(parts: RecordParts) -> Option<Self> {
        Self::from_parts_at(parts, Timestamp::now())
    }

    /// Build a record with an explicit extraction time.
    #[must_use]
    pub fn from_parts_at(parts: RecordParts, scraped_at: Timestamp) -> Option<Self> {
        if parts.name.trim().is_empty() {
            return None;
        }

        let price = non_negative(parts.price);
        let discount_percentage = discount_percentage(price, parts.original_price);

        Some(Self {
            name: parts.name,
            price,
            discount_percentage,
            popularity: non_negative(parts.popularity),
            tag_line: parts.tag_line,
            url: parts.url,
            brand: parts.brand,
            placement: parts.placement,
            category: parts.category,
            scraped_at,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[must_use]
    pub fn discount_percentage(&self) -> f64 {
        self.discount_percentage
    }

    /// Rating or review-count proxy.
    #[must_use]
    pub fn popularity(&self) -> f64 {
        self.popularity
    }

    /// Seller name or promotional tag line.
    #[must_use]
    pub fn tag_line(&self) -> &str {
        &self.tag_line
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[must_use]
    pub fn brand(&self) -> &str {
        &self.brand
    }

    #[must_use]
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match &self.placement {
            Some(Placement::Location(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn quantity_sold(&self) -> Option<&str> {
        match &self.placement {
            Some(Placement::QuantitySold(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn scraped_at(&self) -> Timestamp {
        self.scraped_at
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Percentage saved relative to `original`, rounded to two places.
///
/// Zero when the original price is unknown or not above the current one.
#[must_use]
pub fn discount_percentage(current: f64, original: Option<f64>) -> f64 {
    match original {
        Some(original) if original.is_finite() && original > current && original > 0.0 => {
            round2(100.0 * (original - current) / original).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// Flat row over [`DATA_FIELDS`]; absent values are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    pub product_name: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub review_count: f64,
    pub discount_tag_line: String,
    pub product_url: String,
    pub brand: String,
    pub location: String,
    pub quantity_sold: String,
    pub category: String,
    pub scraped_at: String,
}

impl From<&ListingRecord> for ListingRow {
    fn from(record: &ListingRecord) -> Self {
        Self {
            product_name: record.name.clone(),
            price: record.price,
            discount_percentage: record.discount_percentage,
            review_count: record.popularity,
            discount_tag_line: record.tag_line.clone(),
            product_url: record.url.clone().unwrap_or_default(),
            brand: record.brand.clone(),
            location: record.location().unwrap_or_default().to_string(),
            quantity_sold: record.quantity_sold().unwrap_or_default().to_string(),
            category: record.category.clone(),
            scraped_at: record.scraped_at.to_rfc3339(),
        }
    }
}
