use storefront_core::{FilterConfig, ListingRecord};

/// Decides which records a run keeps.
///
/// Keywords and brand are matched case-insensitively as substrings of the
/// name. Price bounds are inclusive.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    min_price: f64,
    max_price: Option<f64>,
    include: Vec<String>,
    exclude: Vec<String>,
    brand: Option<String>,
}

impl FilterPolicy {
    pub fn new(config: &FilterConfig) -> Self {
        let lowered = |words: &[String]| {
            words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
        };

        Self {
            min_price: config.min_price,
            max_price: config.max_price,
            include: lowered(&config.include_keywords),
            exclude: lowered(&config.exclude_keywords),
            brand: config
                .brand
                .as_deref()
                .map(|b| b.trim().to_lowercase())
                .filter(|b| !b.is_empty()),
        }
    }

    pub fn keep(&self, record: &ListingRecord) -> bool {
        let name = record.name().to_lowercase();

        if self.exclude.iter().any(|word| name.contains(word.as_str())) {
            return false;
        }

        if !self.include.is_empty() && !self.include.iter().any(|word| name.contains(word.as_str()))
        {
            return false;
        }

        if let Some(brand) = &self.brand {
            if !name.contains(brand.as_str()) {
                return false;
            }
        }

        let price = record.price();
        price >= self.min_price && self.max_price.map_or(true, |max| price <= max)
    }

    /// Keep the records that pass, in order.
    pub fn apply(&self, records: Vec<ListingRecord>) -> Vec<ListingRecord> {
        let before = records.len();
        let kept: Vec<_> = records.into_iter().filter(|r| self.keep(r)).collect();
        if kept.len() < before {
            tracing::debug!(dropped = before - kept.len(), kept = kept.len(), "filtered batch");
        }
        kept
    }
}
