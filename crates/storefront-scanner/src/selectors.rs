use crate::error::{Result, ScrapeError};
use scraper::{ElementRef, Selector};
use storefront_core::{Field, SelectorConfig};

/// Ordered, pre-parsed selector candidates for one field.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    candidates: Vec<Selector>,
}

impl SelectorChain {
    /// Parse every candidate, failing on the first invalid expression.
    pub fn compile<'a>(field: Field, exprs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let candidates = exprs
            .into_iter()
            .map(|expr| {
                Selector::parse(expr).map_err(|e| ScrapeError::InvalidSelector {
                    field: field.to_string(),
                    reason: format!("{expr:?}: {e}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[Selector] {
        &self.candidates
    }

    /// Trimmed text of the first candidate whose first match has any.
    ///
    /// Later candidates are not consulted once one yields text.
    pub fn first_text(&self, element: &ElementRef<'_>) -> Option<String> {
        self.candidates.iter().find_map(|selector| {
            let matched = element.select(selector).next()?;
            let text = element_text(&matched);
            (!text.is_empty()).then_some(text)
        })
    }

    /// Like [`first_text`](Self::first_text), falling back to an attribute of
    /// the same match when its text is empty.
    pub fn first_text_or_attr(&self, element: &ElementRef<'_>, attr: &str) -> Option<String> {
        self.candidates.iter().find_map(|selector| {
            let matched = element.select(selector).next()?;
            let text = element_text(&matched);
            if !text.is_empty() {
                return Some(text);
            }
            matched
                .value()
                .attr(attr)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
    }

    /// Non-empty attribute of the first candidate match that carries it.
    pub fn first_attr(&self, element: &ElementRef<'_>, attr: &str) -> Option<String> {
        self.candidates.iter().find_map(|selector| {
            element
                .select(selector)
                .find_map(|matched| matched.value().attr(attr))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
    }
}

/// Concatenated, trimmed text content of an element.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Every selector the extractor and harvester need, parsed once per run.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub primary_cards: SelectorChain,
    pub backup_cards: SelectorChain,
    pub name: SelectorChain,
    pub price: SelectorChain,
    pub original_price: SelectorChain,
    pub rating: SelectorChain,
    pub tag_line: SelectorChain,
    pub location: SelectorChain,
    pub link: SelectorChain,
}

impl ListingSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        let chain = |field: Field| SelectorChain::compile(field, config.chain(field));

        Ok(Self {
            primary_cards: SelectorChain::compile(
                Field::Card,
                config.primary.get(Field::Card).iter().map(String::as_str),
            )?,
            backup_cards: SelectorChain::compile(
                Field::Card,
                config.backup.get(Field::Card).iter().map(String::as_str),
            )?,
            name: chain(Field::Name)?,
            price: chain(Field::Price)?,
            original_price: chain(Field::OriginalPrice)?,
            rating: chain(Field::Rating)?,
            tag_line: chain(Field::TagLine)?,
            location: chain(Field::Location)?,
            link: chain(Field::Link)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const CARD: &str = r#"
        <div class="card">
            <a class="title" href="/p/1" title="Fallback Title"></a>
            <span class="name">   </span>
            <span class="alt-name">Sony WH-1000XM5</span>
        </div>
    "#;

    fn root(html: &Html) -> ElementRef<'_> {
        html.root_element()
    }

    #[test]
    fn test_default_selectors_compile() {
        assert!(ListingSelectors::compile(&SelectorConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_selector_names_field() {
        let err = SelectorChain::compile(Field::Price, [".ok", "[[broken"]).unwrap_err();
        match err {
            ScrapeError::InvalidSelector { field, reason } => {
                assert_eq!(field, "price");
                assert!(reason.contains("[[broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_text_skips_blank_matches() {
        let html = Html::parse_fragment(CARD);
        let chain = SelectorChain::compile(Field::Name, [".missing", ".name", ".alt-name"]).unwrap();
        assert_eq!(chain.first_text(&root(&html)).as_deref(), Some("Sony WH-1000XM5"));
    }

    #[test]
    fn test_first_text_stops_at_first_hit() {
        let html = Html::parse_fragment(CARD);
        let chain = SelectorChain::compile(Field::Name, [".alt-name", ".name"]).unwrap();
        assert_eq!(chain.first_text(&root(&html)).as_deref(), Some("Sony WH-1000XM5"));
    }

    #[test]
    fn test_title_attribute_fallback() {
        let html = Html::parse_fragment(CARD);
        let chain = SelectorChain::compile(Field::Name, ["a[title]"]).unwrap();
        assert_eq!(chain.first_text(&root(&html)), None);
        assert_eq!(
            chain.first_text_or_attr(&root(&html), "title").as_deref(),
            Some("Fallback Title")
        );
    }

    #[test]
    fn test_first_attr() {
        let html = Html::parse_fragment(CARD);
        let chain = SelectorChain::compile(Field::Link, ["a[href]"]).unwrap();
        assert_eq!(chain.first_attr(&root(&html), "href").as_deref(), Some("/p/1"));
    }
}
