//! Storefront command line runner.
//!
//! Loads the scrape configuration, applies command line overrides, runs one
//! scrape and writes the records as JSON rows.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use storefront_browser::BrowserEngine;
use storefront_core::{ListingRecord, ListingRow, ScrapeConfiguration};
use storefront_scanner::ScrapeOrchestrator;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Scrape product listings from a storefront catalog")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Product category to scrape
    #[arg(long)]
    category: Option<String>,

    /// Search query (overrides the category)
    #[arg(long)]
    search_query: Option<String>,

    /// Direct catalog URL (overrides category and search query)
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of pages to visit
    #[arg(long)]
    max_pages: Option<u32>,

    /// Stop once this many listings have been kept
    #[arg(long)]
    min_records: Option<usize>,

    /// Minimum price, inclusive
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum price, inclusive
    #[arg(long)]
    max_price: Option<f64>,

    /// Keywords a listing name must contain (comma or space separated)
    #[arg(long, visible_alias = "include-words")]
    include_keywords: Option<String>,

    /// Keywords that drop a listing (comma or space separated)
    #[arg(long, visible_alias = "exclude-words")]
    exclude_keywords: Option<String>,

    /// Only keep listings of this brand
    #[arg(long)]
    brand: Option<String>,

    /// Require the category's keywords when no include keywords are given
    #[arg(long)]
    category_keywords: bool,

    /// Run the browser headless
    #[arg(long, conflicts_with = "visible")]
    headless: bool,

    /// Show the browser window
    #[arg(long)]
    visible: bool,

    /// Chrome or Chromium executable
    #[arg(long, env = "CHROME")]
    chrome: Option<PathBuf>,

    /// Write JSON rows here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Debug logging for the storefront crates
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    /// Layer flag overrides on top of the loaded configuration.
    fn apply(&self, config: &mut ScrapeConfiguration) {
        let target = &mut config.target;
        if let Some(category) = &self.category {
            target.category.clone_from(category);
        }
        if let Some(query) = &self.search_query {
            target.search_query = Some(query.clone());
        }
        if let Some(url) = &self.url {
            target.url = Some(url.clone());
        }

        if let Some(max_pages) = self.max_pages {
            config.limits.max_pages = max_pages;
        }
        if let Some(min_records) = self.min_records {
            config.limits.min_records = min_records;
        }

        let filters = &mut config.filters;
        if let Some(min_price) = self.min_price {
            filters.min_price = min_price;
        }
        if let Some(max_price) = self.max_price {
            filters.max_price = Some(max_price);
        }
        if let Some(words) = &self.include_keywords {
            filters.include_keywords = parse_keywords(words);
        }
        if let Some(words) = &self.exclude_keywords {
            filters.exclude_keywords = parse_keywords(words);
        }
        if let Some(brand) = &self.brand {
            filters.brand = Some(brand.clone());
        }
        if self.category_keywords {
            filters.category_keywords = true;
        }

        if self.headless {
            config.browser.headless = true;
        } else if self.visible {
            config.browser.headless = false;
        }
    }

    fn load_config(&self) -> anyhow::Result<ScrapeConfiguration> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = ScrapeConfiguration::load_from(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                config.apply_env_overrides(|key| std::env::var(key).ok());
                config
            }
            None => ScrapeConfiguration::load_with_env()?,
        };
        self.apply(&mut config);
        Ok(config)
    }
}

/// Split a keyword list on commas if it has any, else on whitespace.
fn parse_keywords(raw: &str) -> Vec<String> {
    let words: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split_whitespace().collect()
    };
    words
        .into_iter()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "info,storefront=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn write_rows(records: &[ListingRecord], output: Option<&Path>) -> anyhow::Result<()> {
    let rows: Vec<ListingRow> = records.iter().map(ListingRow::from).collect();
    let json = serde_json::to_string_pretty(&rows)?;

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = rows.len(), "saved listings");
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::info!("Starting storefront v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.load_config()?;
    tracing::info!(
        key = config.target.active_key(),
        max_pages = config.limits.max_pages,
        min_price = config.filters.min_price,
        max_price = ?config.filters.max_price,
        "configuration loaded"
    );

    let engine = match &cli.chrome {
        Some(path) => BrowserEngine::with_executable(path.clone()),
        None => BrowserEngine::new(),
    };
    let orchestrator = ScrapeOrchestrator::new(engine);

    let records = match orchestrator.run(&config).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("scrape failed: {}", e);
            return Err(e.into());
        }
    };

    if records.is_empty() {
        bail!("no listings were scraped");
    }

    write_rows(&records, cli.output.as_deref())?;
    tracing::info!(total = records.len(), "done");
    Ok(())
}
