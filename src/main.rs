//! Sitemapper main entry point
//!
//! This is the command-line interface for the sitemapper crawler.

use anyhow::{bail, Context};
use clap::Parser;
use sitemapper::config::{load_config_with_hash, resolve_site_url, Config};
use sitemapper::crawler::{build_http_client, run_crawl};
use sitemapper::output::print_statistics;
use sitemapper::robots::RobotsPolicy;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Sitemapper: a polite single-site crawler
///
/// Sitemapper crawls one website from a seed URL while respecting its
/// robots.txt rules and crawl-delay, and writes a `{host}.json` sitemap of
/// every page's links, stylesheets, scripts and images.
#[derive(Parser, Debug)]
#[command(name = "sitemapper")]
#[command(version)]
#[command(about = "A polite single-site sitemap crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Site to crawl (overrides the configuration file)
    #[arg(long, env = "SITE_URL", value_name = "URL")]
    site_url: Option<String>,

    /// Directory the sitemap is written to (overrides the configuration file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and check robots.txt for the seed without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(dir) = cli.output_dir {
        config.output.directory = dir;
    }

    let override_url = match cli.site_url {
        Some(url) => Some(url),
        None if config.crawler.site_url.is_none() => {
            Some(prompt_site_url().context("failed to read site URL from stdin")?)
        }
        None => None,
    };
    let site = resolve_site_url(&mut config, override_url).context("no usable site URL")?;

    if cli.dry_run {
        return handle_dry_run(&config, &site).await;
    }

    handle_crawl(config, site).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemapper=info,warn"),
            1 => EnvFilter::new("sitemapper=debug,info"),
            2 => EnvFilter::new("sitemapper=trace,debug"),
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

/// Asks for the site on stdin when no other source supplied one
fn prompt_site_url() -> std::io::Result<String> {
    print!("Enter site to crawl: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Handles the --dry-run mode: shows the effective configuration and the
/// robots.txt verdict for the seed
async fn handle_dry_run(config: &Config, site: &Url) -> anyhow::Result<()> {
    println!("=== Sitemapper Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Site: {}", site);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout);
    println!("  robots.txt max age: {}s", config.crawler.robots_max_age);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());
    println!(
        "  robots.txt directory: {}",
        config.output.robots_directory.display()
    );
    println!("  Format: {:?}", config.output.format);
    println!("  Summary: {}", config.output.summary);

    let client = build_http_client(&config.user_agent, &config.crawler)
        .context("failed to build HTTP client")?;
    let robots = RobotsPolicy::new(
        client,
        config.output.robots_directory.clone(),
        config.crawler.robots_max_age(),
    );
    let rules = robots
        .load(site)
        .await
        .with_context(|| format!("failed to load robots.txt for {}", site))?;

    println!("\nrobots.txt:");
    println!("  Applies to all user agents: {}", rules.user_agent_matched);
    println!("  Disallowed prefixes: {}", rules.disallowed_paths.len());
    println!("  Allowed prefixes: {}", rules.allowed_paths.len());
    println!("  Crawl delay: {}s", rules.crawl_delay_seconds);

    println!("\n✓ Configuration is valid");
    if rules.user_agent_matched && rules.is_allowed(site.path()) {
        println!("✓ Would start crawling at {}", site);
    } else {
        println!("✗ robots.txt does not allow crawling {}", site);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, site: Url) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current page");
            interrupt.cancel();
        }
    });

    let outcome = match run_crawl(config, site.clone(), cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).with_context(|| format!("crawl of {} failed", site));
        }
    };

    print_statistics(&outcome.report.statistics);
    println!();
    if let Some(path) = &outcome.summary_path {
        println!("Summary: {}", path.display());
    }
    println!("Sitemap: {}", outcome.sitemap_path.display());

    if outcome.report.stop_reason.is_failure() {
        bail!("crawl of {} {}", site, outcome.report.stop_reason);
    }

    Ok(())
}
