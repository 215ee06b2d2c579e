//! Imprint-Scout main entry point
//!
//! This is the command-line interface for resolving association homepages
//! and discovering their imprint pages.

use anyhow::Context;
use clap::{Parser, Subcommand};
use imprint_scout::config::{load_config_with_hash, Config};
use imprint_scout::crawler::SiteCrawler;
use imprint_scout::jobs::{self, Paging};
use imprint_scout::resolver::Resolver;
use imprint_scout::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Imprint-Scout: homepage resolution and imprint discovery
///
/// Keeps the homepage and imprint links of a member-association registry
/// up to date. Homepages are probed over HTTPS first and HTTP second;
/// imprints are found by crawling a few pages of each homepage.
#[derive(Parser, Debug)]
#[command(name = "imprint-scout")]
#[command(version)]
#[command(about = "Homepage resolution and imprint discovery", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one homepage string and print the reachable URL
    Resolve {
        /// Homepage as typed, e.g. "www.musikverein.de"
        raw: String,
    },

    /// Crawl one site and print the best imprint link
    FindImprint {
        /// Homepage URL to start from
        url: Url,

        /// Page-fetch budget (overrides the configuration)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Keyword to look for, highest priority first (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },

    /// Add or update one association and resolve its homepage
    Add {
        /// Association number
        #[arg(long)]
        number: String,

        /// Association name
        #[arg(long)]
        name: String,

        /// Homepage as typed
        #[arg(long)]
        homepage: Option<String>,
    },

    /// Re-resolve the homepage of every stored association
    UpdateHomepages,

    /// Crawl stored homepages for imprint links
    RefreshImprints {
        /// Number of associations to skip
        #[arg(long, default_value_t = 0)]
        skip: u32,

        /// Maximum number of associations to process
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List recorded problems
    Problems {
        /// Only show problems of this association
        #[arg(long)]
        number: Option<String>,
    },

    /// Validate the configuration and print the effective values
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_deref())?;

    match cli.command {
        Command::Resolve { raw } => handle_resolve(&config, &raw).await,
        Command::FindImprint {
            url,
            max_pages,
            keywords,
        } => handle_find_imprint(&config, &url, max_pages, keywords).await,
        Command::Add {
            number,
            name,
            homepage,
        } => handle_add(&config, &number, &name, homepage.as_deref()).await,
        Command::UpdateHomepages => handle_update_homepages(&config).await,
        Command::RefreshImprints { skip, limit } => {
            handle_refresh_imprints(&config, Paging { skip, limit }).await
        }
        Command::Problems { number } => handle_problems(&config, number.as_deref()),
        Command::CheckConfig => {
            handle_check_config(&config);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("imprint_scout=info,warn"),
            1 => EnvFilter::new("imprint_scout=debug,info"),
            2 => EnvFilter::new("imprint_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn open_storage(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    SqliteStorage::new(path).with_context(|| format!("failed to open {}", path.display()))
}

/// Cancels the returned token on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            trigger.cancel();
        }
    });
    token
}

async fn handle_resolve(config: &Config, raw: &str) -> anyhow::Result<()> {
    let resolver = Resolver::new(&config.http)?;
    let resolved = resolver.resolve(raw).await?;

    match (resolved.scheme(), resolved.url()) {
        (Some(scheme), Some(url)) => println!("{}\t{}", scheme, url),
        _ => println!("unreachable"),
    }
    Ok(())
}

async fn handle_find_imprint(
    config: &Config,
    url: &Url,
    max_pages: Option<u32>,
    keywords: Vec<String>,
) -> anyhow::Result<()> {
    let keywords = if keywords.is_empty() {
        config.crawler.keywords.clone()
    } else {
        keywords
    };
    let max_pages = max_pages.unwrap_or(config.crawler.max_pages);

    let crawler = SiteCrawler::new(&config.http)?;
    let cancel = cancel_on_ctrl_c();

    match crawler
        .find_link_by_keyword_with_cancel(url, &keywords, max_pages, &cancel)
        .await
    {
        Some(link) => println!("{}", link),
        None => println!("not found"),
    }
    Ok(())
}

async fn handle_add(
    config: &Config,
    number: &str,
    name: &str,
    homepage: Option<&str>,
) -> anyhow::Result<()> {
    let mut storage = open_storage(config)?;
    storage.upsert_association(number, name, homepage)?;

    let resolver = Resolver::new(&config.http)?;
    let summary = jobs::resolve_association(&mut storage, &resolver, number).await?;

    let record = storage.get_association(number)?;
    println!(
        "{}\t{}\t{}",
        record.number,
        record.name,
        record.homepage.as_deref().unwrap_or("-")
    );
    tracing::info!("{}", summary);
    Ok(())
}

async fn handle_update_homepages(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_storage(config)?;
    let resolver = Resolver::new(&config.http)?;
    let cancel = cancel_on_ctrl_c();

    let summary = jobs::update_homepages(&mut storage, &resolver, &cancel).await?;
    println!("Homepages: {}", summary);
    Ok(())
}

async fn handle_refresh_imprints(config: &Config, paging: Paging) -> anyhow::Result<()> {
    let mut storage = open_storage(config)?;
    let crawler = SiteCrawler::new(&config.http)?;
    let cancel = cancel_on_ctrl_c();

    let summary =
        jobs::refresh_imprints(&mut storage, &crawler, &config.crawler, paging, &cancel).await?;
    println!("Imprints: {}", summary);
    Ok(())
}

fn handle_problems(config: &Config, number: Option<&str>) -> anyhow::Result<()> {
    let storage = open_storage(config)?;

    let problems = storage.list_problems(number)?;
    if problems.is_empty() {
        println!("No problems recorded");
        return Ok(());
    }

    for problem in &problems {
        println!(
            "{}\t{}\t{}\t{}",
            problem.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            problem.association,
            problem.kind,
            problem.data
        );
    }
    Ok(())
}

/// Prints the effective configuration
fn handle_check_config(config: &Config) {
    println!("=== Imprint-Scout Configuration ===\n");

    println!("HTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Request timeout: {}s", config.http.request_timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    println!("\nCrawler:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Keywords: {}", config.crawler.keywords.join(", "));

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\n✓ Configuration is valid");
}
