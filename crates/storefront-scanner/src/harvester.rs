use crate::extractor::FieldExtractor;
use crate::selectors::{ListingSelectors, SelectorChain};
use scraper::{ElementRef, Html};
use storefront_core::ListingRecord;

/// Collects every listing on a rendered page.
pub struct PageHarvester<'a> {
    selectors: &'a ListingSelectors,
    extractor: FieldExtractor<'a>,
}

impl<'a> PageHarvester<'a> {
    pub fn new(selectors: &'a ListingSelectors, extractor: FieldExtractor<'a>) -> Self {
        Self {
            selectors,
            extractor,
        }
    }

    /// Extract records from a page's HTML.
    ///
    /// Cards are located with the primary selectors, falling back to the
    /// backup set when none match. Cards without a name are skipped. An empty
    /// result is not an error.
    pub fn harvest(&self, html: &str) -> Vec<ListingRecord> {
        let document = Html::parse_document(html);

        let mut cards = find_cards(&document, &self.selectors.primary_cards);
        if cards.is_empty() {
            cards = find_cards(&document, &self.selectors.backup_cards);
            if !cards.is_empty() {
                tracing::debug!(count = cards.len(), "found listings with backup selectors");
            }
        }

        if cards.is_empty() {
            tracing::warn!("no listing elements on page");
            return Vec::new();
        }

        let total = cards.len();
        let records: Vec<ListingRecord> = cards
            .iter()
            .enumerate()
            .filter_map(|(index, card)| {
                let record = self.extractor.extract(card);
                if record.is_none() {
                    tracing::debug!(index, "skipping listing without a name");
                }
                record
            })
            .collect();

        tracing::info!(
            found = total,
            extracted = records.len(),
            "harvested page"
        );
        records
    }
}

/// Matches of the first candidate that matches anything.
fn find_cards<'d>(document: &'d Html, chain: &SelectorChain) -> Vec<ElementRef<'d>> {
    chain
        .candidates()
        .iter()
        .map(|selector| document.select(selector).collect::<Vec<_>>())
        .find(|cards| !cards.is_empty())
        .unwrap_or_default()
}
