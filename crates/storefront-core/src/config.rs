//! Configuration management for storefront scraping.
//!
//! A [`ScrapeConfiguration`] is built once per run, from TOML (with XDG paths
//! and environment overrides) or from defaults, and passed by reference into
//! the scanner. Nothing mutates it while a scrape is in progress.

use crate::catalog::CatalogTables;
use crate::error::{ConfigError, ConfigResult};
use crate::selectors::{Field, SelectorConfig};
use directories::ProjectDirs;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete settings for one scrape run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfiguration {
    /// What to scrape
    pub target: TargetConfig,
    /// Page and record limits
    pub limits: LimitsConfig,
    /// Record filters
    pub filters: FilterConfig,
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Waits and delays
    pub timing: TimingConfig,
    /// Whole-run retry policy
    pub retry: RetryPolicy,
    /// CSS selector tables
    pub selectors: SelectorConfig,
    /// Category and brand tables
    pub catalog: CatalogTables,
}

impl ScrapeConfiguration {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit TOML file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `STOREFRONT_HEADLESS`: Override browser headless mode (true/false)
    /// - `STOREFRONT_MAX_PAGES`: Override the page limit
    /// - `STOREFRONT_MIN_RECORDS`: Override the record target
    /// - `STOREFRONT_CATEGORY`: Override the category key
    /// - `STOREFRONT_URL`: Scrape this URL directly
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Unparsable values are ignored with a debug log.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("STOREFRONT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("STOREFRONT_MAX_PAGES") {
            if let Ok(pages) = val.parse() {
                self.limits.max_pages = pages;
                tracing::debug!("Override limits.max_pages from env: {}", pages);
            }
        }

        if let Some(val) = lookup("STOREFRONT_MIN_RECORDS") {
            if let Ok(records) = val.parse() {
                self.limits.min_records = records;
                tracing::debug!("Override limits.min_records from env: {}", records);
            }
        }

        if let Some(val) = lookup("STOREFRONT_CATEGORY") {
            if !val.trim().is_empty() {
                tracing::debug!("Override target.category from env: {}", val);
                self.target.category = val;
            }
        }

        if let Some(val) = lookup("STOREFRONT_URL") {
            if !val.trim().is_empty() {
                tracing::debug!("Override target.url from env: {}", val);
                self.target.url = Some(val);
            }
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/storefront/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "storefront", "storefront").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Check values that would make a run meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.limits.max_pages == 0 {
            return Err(invalid("limits.max_pages", "must be at least 1"));
        }

        if let Some(max) = self.filters.max_price {
            if self.filters.min_price > max {
                return Err(invalid(
                    "filters.min_price",
                    &format!("{} exceeds max_price {max}", self.filters.min_price),
                ));
            }
        }

        if self.retry.backoff_factor.is_nan() || self.retry.backoff_factor < 1.0 {
            return Err(invalid("retry.backoff_factor", "must be at least 1.0"));
        }

        if self.timing.page_delay_ms.min > self.timing.page_delay_ms.max {
            return Err(invalid("timing.page_delay_ms", "min exceeds max"));
        }

        if self.selectors.primary.get(Field::Card).is_empty()
            && self.selectors.backup.get(Field::Card).is_empty()
        {
            return Err(invalid("selectors", "no card selector configured"));
        }

        if self.browser.user_agents.is_empty() {
            return Err(invalid("browser.user_agents", "pool cannot be empty"));
        }

        Ok(())
    }

    /// Filters in effect for this run.
    ///
    /// When `category_keywords` is set and no include keywords were given,
    /// the include list comes from the active category.
    #[must_use]
    pub fn effective_filters(&self) -> FilterConfig {
        if self.filters.category_keywords && self.filters.include_keywords.is_empty() {
            let derived = FilterConfig::derive(self.target.active_key(), &self.catalog);
            FilterConfig {
                include_keywords: derived.include_keywords,
                ..self.filters.clone()
            }
        } else {
            self.filters.clone()
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// What to scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base for resolving relative product links
    pub base_url: String,
    /// Search endpoint used for unknown category keys
    pub search_url: String,
    /// Category key
    pub category: String,
    /// Free-text query, takes precedence over `category` as the active key
    pub search_query: Option<String>,
    /// Direct URL, takes precedence over everything else
    pub url: Option<String>,
}

impl TargetConfig {
    /// The search/category key recorded on every listing.
    #[must_use]
    pub fn active_key(&self) -> &str {
        self.search_query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(&self.category)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.lazada.sg".to_string(),
            search_url: "https://www.lazada.sg/catalog/".to_string(),
            category: "electronics".to_string(),
            search_query: None,
            url: None,
        }
    }
}

/// Page and record limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of pages to visit
    pub max_pages: u32,
    /// Stop paginating once this many filtered records are collected
    pub min_records: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pages: 3,
            min_records: 100,
        }
    }
}

/// Record filters. Keyword matching is case-insensitive substring matching on the name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Inclusive lower price bound
    pub min_price: f64,
    /// Inclusive upper price bound, unbounded if absent
    pub max_price: Option<f64>,
    /// At least one must occur in the name, if any are given
    pub include_keywords: Vec<String>,
    /// None may occur in the name
    pub exclude_keywords: Vec<String>,
    /// Must occur in the name, if given
    pub brand: Option<String>,
    /// Derive include keywords from the category when none are given
    pub category_keywords: bool,
}

impl FilterConfig {
    /// Filters implied by a category key alone.
    #[must_use]
    pub fn derive(category: &str, catalog: &CatalogTables) -> Self {
        Self {
            include_keywords: catalog.keywords_for(category).to_vec(),
            ..Self::default()
        }
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Page navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// Per-command protocol timeout in milliseconds
    pub request_timeout_ms: u64,
    /// User agents to pick from, one per session
    pub user_agents: Vec<String>,
    /// Hide automation markers from page scripts
    pub stealth: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_ms: 60_000,
            request_timeout_ms: 45_000,
            user_agents: [
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
            ]
            .iter()
            .map(|ua| (*ua).to_string())
            .collect(),
            stealth: true,
        }
    }
}

/// Waits and delays, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait for primary card selectors
    pub primary_wait_ms: u64,
    /// Wait for backup card selectors after the primary wait times out
    pub backup_wait_ms: u64,
    /// Pause after the first navigation
    pub initial_settle_ms: u64,
    /// Pause after clicking "next"
    pub advance_settle_ms: u64,
    /// Pause after scrolling to the bottom
    pub scroll_settle_ms: u64,
    /// Pause after dismissing a popup
    pub popup_settle_ms: u64,
    /// Randomized pause between pages
    pub page_delay_ms: DelayRange,
}

impl TimingConfig {
    /// All waits and delays set to zero.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            primary_wait_ms: 0,
            backup_wait_ms: 0,
            initial_settle_ms: 0,
            advance_settle_ms: 0,
            scroll_settle_ms: 0,
            popup_settle_ms: 0,
            page_delay_ms: DelayRange { min: 0, max: 0 },
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            primary_wait_ms: 15_000,
            backup_wait_ms: 10_000,
            initial_settle_ms: 5_000,
            advance_settle_ms: 3_000,
            scroll_settle_ms: 3_000,
            popup_settle_ms: 1_000,
            page_delay_ms: DelayRange {
                min: 2_000,
                max: 5_000,
            },
        }
    }
}

/// Inclusive millisecond range for randomized delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    /// Draw a delay uniformly from the range.
    #[must_use]
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Draw a delay using the given generator.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return Duration::from_millis(self.min);
        }
        Duration::from_millis(rng.gen_range(self.min..=self.max))
    }
}

/// Whole-run retry policy with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub delay_ms: u64,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31) as i32;
        let millis = self.delay_ms as f64 * self.backoff_factor.powi(exponent);
        Duration::from_millis(millis.round().min(u64::MAX as f64) as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 3_000,
            backoff_factor: 2.0,
        }
    }
}
