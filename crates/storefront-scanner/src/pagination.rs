use crate::pacing::Pause;
use storefront_browser::{BrowserActions, ControlState};
use storefront_core::{Field, ScrapeConfiguration, SelectorConfig, TimingConfig};

/// Where the controller is within the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Waiting for listing elements to render
    AwaitingContent,
    /// Content is (or is assumed) present and can be harvested
    Ready,
    /// A "next" control was clicked and the new page is loading
    Advancing,
    /// No further pages; terminal for the run
    Exhausted,
}

/// Drives waits, scrolling and "next page" clicks on one session.
///
/// Nothing here fails the run: timeouts degrade to [`PageState::Ready`] and
/// click or navigation problems end pagination with
/// [`PageState::Exhausted`].
pub struct Paginator<'a, S: ?Sized, P: ?Sized> {
    session: &'a S,
    pause: &'a P,
    selectors: &'a SelectorConfig,
    timing: &'a TimingConfig,
    load_timeout_ms: u64,
    primary_cards: String,
    backup_cards: String,
    any_card: String,
    state: PageState,
}

impl<'a, S, P> Paginator<'a, S, P>
where
    S: BrowserActions + ?Sized,
    P: Pause + ?Sized,
{
    pub fn new(session: &'a S, pause: &'a P, config: &'a ScrapeConfiguration) -> Self {
        let selectors = &config.selectors;
        Self {
            session,
            pause,
            selectors,
            timing: &config.timing,
            load_timeout_ms: config.browser.navigation_timeout_ms,
            primary_cards: selectors.primary.card.join(", "),
            backup_cards: selectors.backup.card.join(", "),
            any_card: selectors.any_card(),
            state: PageState::AwaitingContent,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Wait for listings with the primary selectors, then the backup ones.
    ///
    /// Always ends in [`PageState::Ready`] unless pagination is exhausted.
    pub async fn await_content(&mut self) -> PageState {
        if self.state == PageState::Exhausted {
            return self.state;
        }
        self.state = PageState::AwaitingContent;

        let tiers = [
            (self.primary_cards.as_str(), self.timing.primary_wait_ms),
            (self.backup_cards.as_str(), self.timing.backup_wait_ms),
        ];

        let mut found = false;
        for (selector, timeout_ms) in tiers {
            if selector.is_empty() {
                continue;
            }
            match self.session.wait_for_selector(selector, timeout_ms).await {
                Ok(()) => {
                    found = true;
                    break;
                }
                Err(e) => tracing::debug!(selector, "listing wait failed: {}", e),
            }
        }

        if !found {
            tracing::warn!("listings did not appear in time, harvesting anyway");
        }
        self.state = PageState::Ready;
        self.state
    }

    /// Click through to the next page.
    ///
    /// Returns `false` and moves to [`PageState::Exhausted`] when no enabled
    /// "next" control exists or the click does not lead anywhere.
    pub async fn advance(&mut self) -> bool {
        if self.state == PageState::Exhausted {
            return false;
        }

        let Some((selector, control)) = self.find_next().await else {
            tracing::info!("no next control, pagination exhausted");
            return self.exhaust();
        };

        if control.is_inactive() {
            tracing::info!(selector, "next control disabled, pagination exhausted");
            return self.exhaust();
        }

        self.state = PageState::Advancing;

        if let Err(e) = self.session.click(selector).await {
            tracing::warn!(selector, "clicking next failed: {}", e);
            return self.exhaust();
        }

        if let Err(e) = self.session.wait_for_load(self.load_timeout_ms).await {
            tracing::warn!("next page did not load: {}", e);
            return self.exhaust();
        }

        self.pause.pause_ms(self.timing.advance_settle_ms).await;
        self.await_content().await;
        true
    }

    /// Scroll to the bottom to trigger lazy loading.
    ///
    /// Succeeds only if more listing elements exist afterwards. Does not
    /// change the page state.
    pub async fn scroll_recover(&self) -> bool {
        let before = match self.session.count(&self.any_card).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("counting listings failed: {}", e);
                return false;
            }
        };

        if let Err(e) = self.session.scroll_to_bottom().await {
            tracing::warn!("scrolling failed: {}", e);
            return false;
        }
        self.pause.pause_ms(self.timing.scroll_settle_ms).await;

        let after = match self.session.count(&self.any_card).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("recounting listings failed: {}", e);
                return false;
            }
        };

        tracing::info!(before, after, "scroll recovery");
        after > before
    }

    async fn find_next(&self) -> Option<(&'a str, ControlState)> {
        for selector in self.selectors.chain(Field::NextButton) {
            match self.session.control_state(selector).await {
                Ok(Some(control)) => return Some((selector, control)),
                Ok(None) => {}
                Err(e) => tracing::debug!(selector, "probing next control failed: {}", e),
            }
        }
        None
    }

    fn exhaust(&mut self) -> bool {
        self.state = PageState::Exhausted;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use storefront_browser::{BrowserError, Result as BrowserResult};

    #[derive(Default)]
    struct FakePage {
        cards: AtomicUsize,
        cards_after_scroll: usize,
        controls: HashMap<String, ControlState>,
        fail_load: bool,
        clicks: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl BrowserActions for FakePage {
        async fn navigate(&self, _url: &str) -> BrowserResult<()> {
            Ok(())
        }

        async fn wait_for_selector(&self, selector: &str, _timeout_ms: u64) -> BrowserResult<()> {
            if self.cards.load(Ordering::SeqCst) > 0 {
                Ok(())
            } else {
                Err(BrowserError::Timeout(selector.to_string()))
            }
        }

        async fn count(&self, _selector: &str) -> BrowserResult<usize> {
            Ok(self.cards.load(Ordering::SeqCst))
        }

        async fn control_state(&self, selector: &str) -> BrowserResult<Option<ControlState>> {
            Ok(self.controls.get(selector).cloned())
        }

        async fn click(&self, selector: &str) -> BrowserResult<()> {
            self.clicks.lock().unwrap().push(selector.to_string());
            Ok(())
        }

        async fn wait_for_load(&self, _timeout_ms: u64) -> BrowserResult<()> {
            if self.fail_load {
                Err(BrowserError::Timeout("document".to_string()))
            } else {
                Ok(())
            }
        }

        async fn scroll_to_bottom(&self) -> BrowserResult<()> {
            self.cards.store(self.cards_after_scroll, Ordering::SeqCst);
            Ok(())
        }

        async fn content(&self) -> BrowserResult<String> {
            Ok(String::new())
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Duration>>);

    #[async_trait::async_trait]
    impl Pause for Recorder {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    fn config() -> ScrapeConfiguration {
        ScrapeConfiguration {
            timing: TimingConfig {
                advance_settle_ms: 3_000,
                scroll_settle_ms: 1_000,
                ..TimingConfig::immediate()
            },
            ..ScrapeConfiguration::default()
        }
    }

    fn control(class: &str) -> ControlState {
        ControlState {
            class: class.to_string(),
            disabled: false,
        }
    }

    fn primary_next(config: &ScrapeConfiguration) -> String {
        config.selectors.primary.next_button[0].clone()
    }

    #[tokio::test]
    async fn test_await_content_ready_even_on_timeout() {
        let config = config();
        let page = FakePage::default();
        let pause = Recorder::default();
        let mut paginator = Paginator::new(&page, &pause, &config);

        assert_eq!(paginator.state(), PageState::AwaitingContent);
        assert_eq!(paginator.await_content().await, PageState::Ready);
    }

    #[tokio::test]
    async fn test_advance_clicks_enabled_next() {
        let config = config();
        let next = primary_next(&config);
        let page = FakePage {
            cards: AtomicUsize::new(10),
            controls: HashMap::from([(next.clone(), control("ant-pagination-next"))]),
            ..FakePage::default()
        };
        let pause = Recorder::default();
        let mut paginator = Paginator::new(&page, &pause, &config);

        assert!(paginator.advance().await);
        assert_eq!(paginator.state(), PageState::Ready);
        assert_eq!(*page.clicks.lock().unwrap(), vec![next]);
        assert_eq!(*pause.0.lock().unwrap(), vec![Duration::from_secs(3)]);
    }

    #[tokio::test]
    async fn test_disabled_next_exhausts() {
        let config = config();
        let page = FakePage {
            controls: HashMap::from([(
                primary_next(&config),
                control("ant-pagination-next ant-pagination-disabled"),
            )]),
            ..FakePage::default()
        };
        let pause = Recorder::default();
        let mut paginator = Paginator::new(&page, &pause, &config);

        assert!(!paginator.advance().await);
        assert_eq!(paginator.state(), PageState::Exhausted);
        assert!(page.clicks.lock().unwrap().is_empty());
        // Exhaustion is terminal
        assert!(!paginator.advance().await);
        assert_eq!(paginator.await_content().await, PageState::Exhausted);
    }

    #[tokio::test]
    async fn test_generic_next_used_last() {
        let config = config();
        let generic = config.selectors.generic.next_button[0].clone();
        let page = FakePage {
            controls: HashMap::from([(generic.clone(), control("ant-pagination-next"))]),
            ..FakePage::default()
        };
        let pause = Recorder::default();
        let mut paginator = Paginator::new(&page, &pause, &config);

        assert!(paginator.advance().await);
        assert_eq!(*page.clicks.lock().unwrap(), vec![generic]);
    }

    #[tokio::test]
    async fn test_missing_next_exhausts() {
        let config = config();
        let page = FakePage::default();
        let pause = Recorder::default();
        let mut paginator = Paginator::new(&page, &pause, &config);

        assert!(!paginator.advance().await);
        assert_eq!(paginator.state(), PageState::Exhausted);
    }

    #[tokio::test]
    async fn test_failed_load_exhausts() {
        let config = config();
        let page = FakePage {
            controls: HashMap::from([(primary_next(&config), control("ant-pagination-next"))]),
            fail_load: true,
            ..FakePage::default()
        };
        let pause = Recorder::default();
        let mut paginator = Paginator::new(&page, &pause, &config);

        assert!(!paginator.advance().await);
        assert_eq!(paginator.state(), PageState::Exhausted);
    }

    #[tokio::test]
    async fn test_scroll_recover_needs_growth() {
        let config = config();
        let pause = Recorder::default();

        let growing = FakePage {
            cards: AtomicUsize::new(4),
            cards_after_scroll: 12,
            ..FakePage::default()
        };
        let paginator = Paginator::new(&growing, &pause, &config);
        assert!(paginator.scroll_recover().await);
        assert_eq!(paginator.state(), PageState::AwaitingContent);

        let stuck = FakePage {
            cards: AtomicUsize::new(4),
            cards_after_scroll: 4,
            ..FakePage::default()
        };
        let paginator = Paginator::new(&stuck, &pause, &config);
        assert!(!paginator.scroll_recover().await);

        assert_eq!(pause.0.lock().unwrap().len(), 2);
    }
}
