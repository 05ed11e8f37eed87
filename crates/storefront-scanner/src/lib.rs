//! Storefront Scanner - Catalog listing extraction and pagination.
//!
//! This crate turns rendered catalog pages into [`ListingRecord`]s. It walks
//! a storefront's listing pages in one browser session, extracts each product
//! card with ranked selector fallbacks, filters the results, and retries the
//! whole run with exponential backoff when navigation or the browser fails.
//!
//! # Features
//!
//! - Primary, backup and generic selector tiers for every field
//! - Scroll recovery for lazily loaded listings
//! - "Next" control detection with disabled-state handling
//! - Keyword, brand and price filtering
//! - Whole-run retry with exponential backoff
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_browser::BrowserEngine;
//! use storefront_core::ScrapeConfiguration;
//! use storefront_scanner::ScrapeOrchestrator;
//!
//! let config = ScrapeConfiguration::load_with_env()?;
//! let orchestrator = ScrapeOrchestrator::new(BrowserEngine::new());
//! let records = orchestrator.run(&config).await?;
//! ```
//!
//! [`ListingRecord`]: storefront_core::ListingRecord

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extractor;
#[allow(missing_docs)]
pub mod filter;
#[allow(missing_docs)]
pub mod harvester;
pub mod orchestrator;
pub mod pacing;
#[allow(missing_docs)]
pub mod pagination;
pub mod retry;
#[allow(missing_docs)]
pub mod selectors;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use error::{Result, ScrapeError};
pub use extractor::FieldExtractor;
pub use filter::FilterPolicy;
pub use harvester::PageHarvester;
pub use orchestrator::ScrapeOrchestrator;
pub use pacing::{Pause, TokioPause};
pub use pagination::{PageState, Paginator};
pub use retry::retry_with_backoff;
pub use selectors::{ListingSelectors, SelectorChain};
pub use url_builder::{build_search_url, resolve_target, ResolvedTarget};
