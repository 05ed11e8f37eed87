use crate::error::{Result, ScrapeError};
use storefront_core::{CatalogTables, TargetConfig};
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Where a run starts, and which key its records are tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub url: String,
    pub category: String,
}

/// Resolve the start URL.
///
/// Priority: explicit URL, then the known landing page for the category,
/// then a search for the active key.
pub fn resolve_target(target: &TargetConfig, catalog: &CatalogTables) -> Result<ResolvedTarget> {
    let category = target.active_key().to_string();

    let url = if let Some(url) = target.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let url = url.trim();
        Url::parse(url).map_err(|e| ScrapeError::Navigation {
            url: url.to_string(),
            reason: format!("invalid URL: {e}"),
        })?;
        url.to_string()
    } else if let Some(url) = (!has_query(target))
        .then(|| catalog.category_url(&category))
        .flatten()
    {
        url.to_string()
    } else {
        build_search_url(&target.search_url, &category, 1)
    };

    Ok(ResolvedTarget { url, category })
}

fn has_query(target: &TargetConfig) -> bool {
    target
        .search_query
        .as_deref()
        .is_some_and(|q| !q.trim().is_empty())
}

/// Search URL for `query` at `page`.
pub fn build_search_url(search_url: &str, query: &str, page: u32) -> String {
    let separator = if search_url.contains('?') { '&' } else { '?' };
    let query: String = byte_serialize(query.trim().as_bytes()).collect();
    format!("{search_url}{separator}q={query}&page={page}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(category: &str) -> TargetConfig {
        TargetConfig {
            category: category.to_string(),
            ..TargetConfig::default()
        }
    }

    #[test]
    fn test_unknown_category_builds_search_url() {
        let resolved = resolve_target(&target("gadgets"), &CatalogTables::default()).unwrap();
        assert!(resolved.url.ends_with("?q=gadgets&page=1"));
        assert_eq!(resolved.url, "https://www.lazada.sg/catalog/?q=gadgets&page=1");
        assert_eq!(resolved.category, "gadgets");
    }

    #[test]
    fn test_known_category_uses_landing_page() {
        let resolved = resolve_target(&target("automotive"), &CatalogTables::default()).unwrap();
        assert_eq!(resolved.url, "https://www.lazada.sg/shop-automotive/");
    }

    #[test]
    fn test_direct_url_wins() {
        let mut config = target("automotive");
        config.url = Some("https://www.lazada.sg/shop-groceries/".to_string());
        config.search_query = Some("tyres".to_string());

        let resolved = resolve_target(&config, &CatalogTables::default()).unwrap();
        assert_eq!(resolved.url, "https://www.lazada.sg/shop-groceries/");
        assert_eq!(resolved.category, "tyres");
    }

    #[test]
    fn test_search_query_overrides_category() {
        let mut config = target("automotive");
        config.search_query = Some("wireless earbuds".to_string());

        let resolved = resolve_target(&config, &CatalogTables::default()).unwrap();
        assert_eq!(
            resolved.url,
            "https://www.lazada.sg/catalog/?q=wireless+earbuds&page=1"
        );
        assert_eq!(resolved.category, "wireless earbuds");
    }

    #[test]
    fn test_invalid_direct_url() {
        let mut config = target("automotive");
        config.url = Some("not a url".to_string());
        assert!(resolve_target(&config, &CatalogTables::default()).is_err());
    }

    #[test]
    fn test_search_url_with_existing_query() {
        assert_eq!(
            build_search_url("https://shop.test/search?lang=en", "usb c", 2),
            "https://shop.test/search?lang=en&q=usb+c&page=2"
        );
    }
}
