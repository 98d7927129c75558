//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror site mirror.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_mirror::config::{load_config_with_hash, validate, Config};
use sumi_mirror::crawler::run_mirror;
use sumi_mirror::output::print_statistics;
use sumi_mirror::url::{host_patterns, Classifier};
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: a single-origin static site mirror
///
/// Sumi-Mirror crawls one origin breadth-first, saves every page and asset it
/// reaches, and rewrites the saved HTML so the mirror browses offline.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "A single-origin static site mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the crawl scope without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Override the fetch budget from the config
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the output root from the config
    #[arg(long, value_name = "DIR")]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if apply_overrides(&mut config, &cli) {
        validate(&config).context("Invalid command line override")?;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
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

/// Applies `--max-pages` and `--output`, returning true if anything changed
fn apply_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;

    if let Some(max_pages) = cli.max_pages {
        tracing::info!("Overriding max pages: {}", max_pages);
        config.crawler.max_pages = max_pages;
        changed = true;
    }

    if let Some(output) = &cli.output {
        tracing::info!("Overriding output root: {}", output);
        config.output.root = output.clone();
        changed = true;
    }

    changed
}

/// Handles the --dry-run mode: validates config and shows the crawl scope
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    // Building these proves every pattern compiles
    Classifier::from_config(config).context("Invalid asset rules")?;
    let patterns = host_patterns(&config.assets)?;

    println!("=== Sumi-Mirror Dry Run ===\n");

    println!("Origin: {}", config.origin);

    println!("\nSeeds ({}):", config.crawler.seeds.len() + 1);
    println!("  - /");
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Sitemap pattern: {}", config.crawler.sitemap_pattern);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Root: {}", config.output.root);
    println!("  Index file: {}", config.output.index_file);

    println!("\nAssets:");
    println!("  Extensions: {}", config.assets.extensions.join(" "));
    println!("  Allow-listed hosts ({}):", patterns.len());
    for pattern in config.assets.hosts.iter().chain(&config.assets.host_regex) {
        println!("    * {}", pattern);
    }
    println!(
        "  Off-origin assets: {}",
        if config.assets.restrict_offsite_assets {
            "allow-listed hosts only"
        } else {
            "any host"
        }
    );
    println!("  Hashed fallback bucket: {}", config.assets.bucket);
    println!("  Max path length: {}", config.assets.max_path_len);
    println!("  Max segment length: {}", config.assets.max_segment_len);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Mirroring {} into {} (max {} fetches)",
        config.origin,
        config.output.root,
        config.crawler.max_pages
    );

    let stats = run_mirror(config)
        .await
        .context("Failed to start the mirror")?;

    print_statistics(&stats);
    Ok(())
}
