use storefront_browser::BrowserError;
use storefront_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Invalid {field} selector: {reason}")]
    InvalidSelector { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ScrapeError {
    /// Map a failed page load, keeping timeouts distinct.
    pub fn navigation(url: &str, error: BrowserError) -> Self {
        match error {
            BrowserError::Timeout(reason) => Self::Timeout(reason),
            other => Self::Navigation {
                url: url.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
