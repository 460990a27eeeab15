//! Operator debugging tool: run the scrape pipeline stages against a single
//! URL without a server or database.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use prodex_core::KeywordCategoryDetector;
use prodex_scraper::{
    FetchClient, FetchConfig, ProductScraper, RedirectOutcome, SiteTable,
};

#[derive(Debug, Parser)]
#[command(name = "prodex-cli")]
#[command(about = "Product extraction command line interface")]
struct Cli {
    /// Path to the site descriptor file.
    #[arg(long, env = "PRODEX_SITES_PATH", default_value = "./config/sites.yaml")]
    sites: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape a product URL and print the response envelope.
    Scrape { url: String },
    /// Print which handler a URL classifies to, without fetching.
    Classify { url: String },
    /// Follow a short link's redirect chain and print the outcome.
    Resolve { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let scraper = build_scraper(&cli.sites)?;

    match cli.command {
        Commands::Scrape { url } => {
            let outcome = scraper.scrape(&url).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Classify { url } => {
            let handler = scraper.classify_url(&url)?;
            println!("{}", handler.id());
        }
        Commands::Resolve { url } => match scraper.resolve_url(&url).await {
            RedirectOutcome::Resolved { url, hops } => {
                println!("resolved after {hops} hop(s): {url}");
            }
            RedirectOutcome::Aborted {
                last_url,
                hops,
                reason,
            } => {
                println!("aborted after {hops} hop(s) at {last_url}: {reason:?}");
            }
        },
    }

    Ok(())
}

fn build_scraper(sites_path: &PathBuf) -> anyhow::Result<ProductScraper> {
    let sites = prodex_core::load_sites(sites_path)?;
    let table = SiteTable::from_sites_file(sites);
    let http = FetchClient::new(&FetchConfig::default())?;

    Ok(ProductScraper::new(
        http,
        None,
        table,
        Arc::new(KeywordCategoryDetector::default()),
    ))
}
