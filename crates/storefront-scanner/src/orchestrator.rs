//! Scrape orchestrator for one catalog run.
//!
//! This module provides the `ScrapeOrchestrator` which owns the browser
//! session for a run, walks the catalog pages, and wraps the whole run in the
//! configured retry policy.

use crate::error::{Result, ScrapeError};
use crate::extractor::FieldExtractor;
use crate::filter::FilterPolicy;
use crate::harvester::PageHarvester;
use crate::pacing::{Pause, TokioPause};
use crate::pagination::{PageState, Paginator};
use crate::retry::retry_with_backoff;
use crate::selectors::ListingSelectors;
use crate::url_builder::{resolve_target, ResolvedTarget};
use storefront_browser::{BrowserActions, BrowserSession, SessionLauncher};
use storefront_core::{ConfigError, ListingRecord, ScrapeConfiguration};
use url::Url;

/// Everything derived from the configuration once, before the first attempt.
struct RunPlan<'a> {
    config: &'a ScrapeConfiguration,
    selectors: ListingSelectors,
    target: ResolvedTarget,
    base_url: Url,
    filters: FilterPolicy,
}

impl<'a> RunPlan<'a> {
    fn prepare(config: &'a ScrapeConfiguration) -> Result<Self> {
        config.validate()?;

        let base_url =
            Url::parse(&config.target.base_url).map_err(|e| ConfigError::InvalidValue {
                field: "target.base_url".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            config,
            selectors: ListingSelectors::compile(&config.selectors)?,
            target: resolve_target(&config.target, &config.catalog)?,
            base_url,
            filters: FilterPolicy::new(&config.effective_filters()),
        })
    }
}

/// Runs scrapes, one browser session per attempt.
pub struct ScrapeOrchestrator<L, P = TokioPause> {
    /// Starts browser sessions
    launcher: L,
    /// Sleeps between pages and retries
    pause: P,
}

impl<L: SessionLauncher> ScrapeOrchestrator<L, TokioPause> {
    /// Create an orchestrator that pauses on the Tokio timer.
    #[must_use]
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            pause: TokioPause,
        }
    }
}

impl<L: SessionLauncher, P: Pause> ScrapeOrchestrator<L, P> {
    /// Create an orchestrator with a custom pause implementation.
    #[must_use]
    pub fn with_pause(launcher: L, pause: P) -> Self {
        Self { launcher, pause }
    }

    /// The session launcher.
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// The pause implementation.
    pub fn pause(&self) -> &P {
        &self.pause
    }

    /// Scrape the configured target.
    ///
    /// The whole run, from browser launch onward, is retried per
    /// `config.retry`. Returns the filtered records, which may be fewer than
    /// `limits.min_records` or none at all.
    pub async fn run(&self, config: &ScrapeConfiguration) -> Result<Vec<ListingRecord>> {
        let plan = RunPlan::prepare(config)?;

        tracing::info!(
            url = %plan.target.url,
            category = %plan.target.category,
            max_pages = config.limits.max_pages,
            min_records = config.limits.min_records,
            "starting scrape"
        );

        let records = retry_with_backoff(&config.retry, &self.pause, |attempt| {
            self.run_once(&plan, attempt)
        })
        .await?;

        tracing::info!(total = records.len(), "scrape finished");
        Ok(records)
    }

    /// One attempt: launch, scrape, and always close the session.
    async fn run_once(&self, plan: &RunPlan<'_>, attempt: u32) -> Result<Vec<ListingRecord>> {
        tracing::debug!(attempt, "launching browser session");
        let mut session = self.launcher.launch(&plan.config.browser).await?;

        let outcome = self.drive(&session, plan).await;

        if let Err(e) = session.close().await {
            tracing::warn!("closing browser session failed: {}", e);
        }
        outcome
    }

    async fn drive(&self, session: &L::Session, plan: &RunPlan<'_>) -> Result<Vec<ListingRecord>> {
        let config = plan.config;
        let limits = &config.limits;

        session
            .navigate(&plan.target.url)
            .await
            .map_err(|e| ScrapeError::navigation(&plan.target.url, e))?;
        self.pause.pause_ms(config.timing.initial_settle_ms).await;
        self.dismiss_popups(session, config).await;

        let extractor = FieldExtractor::new(
            &plan.selectors,
            &config.catalog,
            plan.base_url.clone(),
            plan.target.category.as_str(),
        );
        let harvester = PageHarvester::new(&plan.selectors, extractor);
        let mut paginator = Paginator::new(session, &self.pause, config);
        let mut records: Vec<ListingRecord> = Vec::new();

        for page in 1..=limits.max_pages {
            tracing::info!(page, collected = records.len(), "scraping page");
            // A successful advance has already waited for the new listings
            if paginator.state() != PageState::Ready {
                paginator.await_content().await;
            }

            let mut batch = harvester.harvest(&session.content().await?);
            if batch.is_empty() {
                tracing::warn!(page, "no listings harvested, trying scroll recovery");
                if paginator.scroll_recover().await {
                    batch = harvester.harvest(&session.content().await?);
                }
                if batch.is_empty() {
                    tracing::info!(page, "no more listings");
                    break;
                }
            }

            let kept = plan.filters.apply(batch);
            tracing::info!(page, kept = kept.len(), "page harvested");
            records.extend(kept);

            if records.len() >= limits.min_records {
                tracing::info!(collected = records.len(), "record target reached");
                break;
            }
            if page == limits.max_pages {
                break;
            }
            if !paginator.advance().await {
                break;
            }
            self.pause.pause(config.timing.page_delay_ms.sample()).await;
        }

        Ok(records)
    }

    async fn dismiss_popups(&self, session: &L::Session, config: &ScrapeConfiguration) {
        for selector in &config.selectors.popups {
            match session.click_if_present(selector).await {
                Ok(true) => {
                    tracing::debug!(selector = %selector, "dismissed popup");
                    self.pause.pause_ms(config.timing.popup_settle_ms).await;
                }
                Ok(false) => {}
                Err(e) => tracing::debug!(selector = %selector, "popup dismissal failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_rejects_invalid_config() {
        let mut config = ScrapeConfiguration::default();
        config.limits.max_pages = 0;
        assert!(matches!(
            RunPlan::prepare(&config),
            Err(ScrapeError::Config(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_bad_selector() {
        let mut config = ScrapeConfiguration::default();
        config.selectors.primary.price = vec!["span[[".to_string()];
        assert!(matches!(
            RunPlan::prepare(&config),
            Err(ScrapeError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_prepare_rejects_bad_base_url() {
        let mut config = ScrapeConfiguration::default();
        config.target.base_url = "lazada".to_string();
        assert!(matches!(
            RunPlan::prepare(&config),
            Err(ScrapeError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_prepare_resolves_target() {
        let mut config = ScrapeConfiguration::default();
        config.target.category = "gadgets".to_string();
        let plan = RunPlan::prepare(&config).unwrap();
        assert!(plan.target.url.ends_with("?q=gadgets&page=1"));
    }
}
