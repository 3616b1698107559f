//! Sitefold main entry point
//!
//! Command-line interface for the Sitefold website mirroring crawler.

use clap::Parser;
use sitefold::config::load_config;
use sitefold::output::print_report;
use sitefold::{MirrorConfig, WebsiteCrawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitefold: mirror a website into a relocatable local copy
///
/// Sitefold crawls a site from an entry URL, fetches every in-scope page
/// and resource, rewrites references to relative form, and writes a tree
/// that opens via file:// without a web server.
#[derive(Parser, Debug)]
#[command(name = "sitefold")]
#[command(version)]
#[command(about = "Mirror a website into a relocatable local copy", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the entry point URL or path
    #[arg(long, value_name = "URL")]
    entry: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be mirrored without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.entry).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitefold=info,warn"),
            1 => EnvFilter::new("sitefold=debug,info"),
            2 => EnvFilter::new("sitefold=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows the resolved crawl plan without fetching
fn handle_dry_run(config: &MirrorConfig) {
    println!("=== Sitefold Dry Run ===\n");

    println!("Site:");
    println!("  Source: {}", config.site.source_url);
    if let Some(output) = &config.site.new_website_url {
        println!("  Output origin: {}", output);
    }
    if let Some(entry) = &config.site.entry_point {
        println!("  Entry point: {}", entry);
    }

    println!("\nCrawler:");
    if let Some(prefix) = &config.crawler.required_prefix {
        println!("  Required prefix: {}", prefix);
    }
    println!("  Pause between fetches: {}ms", config.crawler.pause_duration_ms);
    println!(
        "  TLS verification: {}",
        if config.crawler.accept_invalid_certs {
            "disabled"
        } else {
            "enabled"
        }
    );

    if !config.crawler.rewrite_urls.is_empty() {
        println!("\nRewritten Prefixes ({}):", config.crawler.rewrite_urls.len());
        for prefix in &config.crawler.rewrite_urls {
            println!("  - {}", prefix);
        }
    }

    if !config.crawler.forbidden_urls.is_empty() {
        println!("\nForbidden Prefixes ({}):", config.crawler.forbidden_urls.len());
        for prefix in &config.crawler.forbidden_urls {
            println!("  - {}", prefix);
        }
    }

    if !config.mounts.is_empty() {
        println!("\nMounts ({}):", config.mounts.len());
        for mount in &config.mounts {
            println!("  {} -> {}", mount.local_prefix, mount.upstream_url);
        }
    }

    println!("\nOutput:");
    match &config.output.directory {
        Some(directory) => println!("  Directory: {}", directory.display()),
        None => println!("  Directory: (none — writer disabled)"),
    }
    println!("  Relocatable URLs: {}", config.output.relocatable_urls);

    println!("\n✓ Configuration is valid");
}

/// Handles the main mirror operation
async fn handle_crawl(
    config: MirrorConfig,
    entry_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.crawler_options();
    let mut crawler = WebsiteCrawler::new(&config.site.source_url, options)?;

    let entry = entry_override.or_else(|| config.site.entry_point.clone());

    match crawler.start(entry.as_deref()).await {
        Ok(report) => {
            print_report(report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Mirror crawl failed: {}", e);
            Err(e.into())
        }
    }
}
