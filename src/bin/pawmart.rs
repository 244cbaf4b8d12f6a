//! Command-line browser for the marketplace API
//!
//! ```text
//! pawmart [config.yaml] [--category NAME] [--search TEXT] [--bracket any|free|low|high]
//!         [--sort newest|priceAscending|priceDescending] [--page N]
//! ```
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=pawmart=debug`).

use anyhow::{Context, Result, bail};
use clap::Parser;
use pawmart::prelude::*;
use serde_json::json;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pawmart")]
#[command(about = "Browse marketplace listings from the command line")]
#[command(version)]
struct Args {
    /// YAML config file; the local development API is used when omitted
    #[arg(value_name = "CONFIG")]
    config_path: Option<String>,

    /// Fetch one category from the API
    #[arg(long)]
    category: Option<String>,

    /// Case-insensitive name search
    #[arg(long)]
    search: Option<String>,

    /// any, free, low or high; unknown values mean any
    #[arg(long, value_parser = PriceBracket::from_str)]
    bracket: Option<PriceBracket>,

    /// newest, priceAscending or priceDescending; unknown values mean newest
    #[arg(long, value_parser = SortOrder::from_str)]
    sort: Option<SortOrder>,

    /// 1-based page, clamped to the available pages
    #[arg(long)]
    page: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config_path {
        Some(path) => MarketConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => MarketConfig::default_config(),
    };
    tracing::info!(base_url = %config.api.base_url, "Using marketplace API");

    let client = HttpMarketClient::new(&config.api)?;
    let scope = match args.category {
        Some(category) => ListingScope::Category(category),
        None => ListingScope::All,
    };
    let mut browser = ListingBrowser::with_scope(client, scope, config.browse.page_size)?;

    if let LoadState::Failed { message, .. } = browser.load().await {
        bail!("could not load listings: {}", message);
    }

    if let Some(search) = args.search {
        browser.set_search(search);
    }
    if let Some(bracket) = args.bracket {
        browser.set_price_bracket(bracket);
    }
    if let Some(sort) = args.sort {
        browser.set_sort(sort);
    }
    if let Some(page) = args.page {
        browser.set_page(page);
    }

    let view = browser.view();
    let output = json!({
        "items": view.page_items,
        "pagination": view.pagination(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_options() {
        let args = Args::try_parse_from([
            "pawmart",
            "market.yaml",
            "--category",
            "pets",
            "--search",
            "bud",
            "--bracket",
            "LOW",
            "--sort",
            "price-descending",
            "--page",
            "2",
        ])
        .unwrap();

        assert_eq!(args.config_path.as_deref(), Some("market.yaml"));
        assert_eq!(args.category.as_deref(), Some("pets"));
        assert_eq!(args.search.as_deref(), Some("bud"));
        assert_eq!(args.bracket, Some(PriceBracket::Low));
        assert_eq!(args.sort, Some(SortOrder::PriceDescending));
        assert_eq!(args.page, Some(2));
    }

    #[test]
    fn test_unknown_values_fall_back_to_defaults() {
        let args =
            Args::try_parse_from(["pawmart", "--bracket", "cheap", "--sort", "random"]).unwrap();

        assert_eq!(args.config_path, None);
        assert_eq!(args.bracket, Some(PriceBracket::Any));
        assert_eq!(args.sort, Some(SortOrder::Newest));
    }

    #[test]
    fn test_usage_errors() {
        assert!(Args::try_parse_from(["pawmart", "--colour", "red"]).is_err());
        assert!(Args::try_parse_from(["pawmart", "--page", "two"]).is_err());
        assert!(Args::try_parse_from(["pawmart", "--search"]).is_err());
        assert!(Args::try_parse_from(["pawmart", "a.yaml", "b.yaml"]).is_err());
    }
}
