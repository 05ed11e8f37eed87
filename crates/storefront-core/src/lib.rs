//! Storefront Core - Foundation crate for the storefront catalog scraper.
//!
//! This crate provides the listing record model, selector and catalog tables,
//! text helpers, error handling and configuration management that the browser,
//! scanner and CLI crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Listing records, output rows and `Timestamp`
//! - [`selectors`] - Tiered CSS selector tables
//! - [`catalog`] - Category URLs, brand lists and category keywords
//! - [`text`] - Text normalization and price parsing
//!
//! # Example
//!
//! ```rust
//! use storefront_core::{CatalogTables, ScrapeConfiguration};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScrapeConfiguration::default();
//! config.validate()?;
//!
//! let catalog = CatalogTables::default();
//! assert_eq!(catalog.infer_brand("Sony WH-1000XM5", "electronics"), "Sony");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalog;
pub mod config;
pub mod error;
#[allow(missing_docs)]
pub mod selectors;
pub mod text;
#[allow(missing_docs)]
pub mod types;

// Re-export commonly used types
pub use catalog::{BrandList, CatalogTables};
pub use config::{
    BrowserSettings, DelayRange, FilterConfig, LimitsConfig, RetryPolicy, ScrapeConfiguration,
    TargetConfig, TimingConfig,
};
pub use error::{ConfigError, ConfigResult, Result, StorefrontError};
pub use selectors::{Field, SelectorConfig, SelectorTable};
pub use types::{ListingRecord, ListingRow, Placement, RecordParts, Timestamp, DATA_FIELDS};
