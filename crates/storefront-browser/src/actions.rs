use crate::error::Result;
use storefront_core::BrowserSettings;

/// Observed state of a clickable control such as a "next page" button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    /// Raw `class` attribute
    pub class: String,
    /// `disabled` property or `aria-disabled="true"`
    pub disabled: bool,
}

impl ControlState {
    /// A control is inactive when disabled or styled as disabled.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        self.disabled || self.class.to_lowercase().contains("disabled")
    }
}

/// Browser actions for catalog automation
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait for a selector to match at least one element
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// Count elements matching a selector
    async fn count(&self, selector: &str) -> Result<usize>;

    /// State of the first element matching a selector, `None` if absent
    async fn control_state(&self, selector: &str) -> Result<Option<ControlState>>;

    /// Scroll the first match into view and click it
    async fn click(&self, selector: &str) -> Result<()>;

    /// Wait until the document has finished parsing
    async fn wait_for_load(&self, timeout_ms: u64) -> Result<()>;

    /// Scroll the window to the bottom of the document
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Serialized DOM of the current page
    async fn content(&self) -> Result<String>;

    /// Click the first match if one exists
    async fn click_if_present(&self, selector: &str) -> Result<bool> {
        if self.count(selector).await? == 0 {
            return Ok(false);
        }
        self.click(selector).await?;
        Ok(true)
    }
}

/// A live page that must be closed explicitly.
#[async_trait::async_trait]
pub trait BrowserSession: BrowserActions {
    /// Release the page and the browser process behind it
    async fn close(&mut self) -> Result<()>;
}

/// Starts browser sessions.
#[async_trait::async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Session type produced by this launcher
    type Session: BrowserSession;

    /// Launch a browser and open one page configured from `settings`
    async fn launch(&self, settings: &BrowserSettings) -> Result<Self::Session>;
}
