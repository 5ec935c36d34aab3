// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Lonkero Recon - Passive Subdomain Enumeration
 * Standalone CLI querying many third-party sources concurrently
 *
 * Features:
 * - Default, explicit or full source selection with exclusions
 * - Recursive-safe source filtering
 * - Per-source API key pools from file or environment
 * - Plain, source-attributed and JSON-lines output
 * - Per-source statistics and raw response archiving
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use lonkero_recon::config::{load_from_env, ConfigLoader, ConfigValidator, ProviderKeys, ReconConfig};
use lonkero_recon::discovery::{Agent, ResultCollector, Source};
use lonkero_recon::registry::SourceRegistry;
use lonkero_recon::reporting::{format_duration, render_statistics, OutputWriter};

/// Lonkero Recon - Passive Subdomain Enumeration
#[derive(Parser)]
#[command(name = "lonkero-recon")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Passive subdomain discovery across many third-party sources.", long_about = None)]
struct Cli {
    /// Target domain(s) to enumerate
    #[arg(short, long)]
    domain: Vec<String>,

    /// File with one target domain per line
    #[arg(long)]
    list: Option<PathBuf>,

    /// Sources to use, comma separated (default: the default source set)
    #[arg(short, long, value_delimiter = ',')]
    sources: Vec<String>,

    /// Sources to exclude, comma separated
    #[arg(long, value_delimiter = ',')]
    exclude_sources: Vec<String>,

    /// Use every available source
    #[arg(long)]
    all: bool,

    /// Only use sources whose results are safe to recurse on
    #[arg(long)]
    recursive: bool,

    /// List available sources and exit
    #[arg(long)]
    list_sources: bool,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write JSON lines instead of plain text
    #[arg(long)]
    json: bool,

    /// Include the sources that reported each host
    #[arg(long)]
    collect_sources: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum minutes to spend on one domain
    #[arg(long)]
    max_time: Option<u64>,

    /// Maximum requests per second across all sources
    #[arg(long)]
    rate_limit: Option<u32>,

    /// Provider credentials file (YAML, `source: [key, ...]`)
    #[arg(long, env = "LONKERO_PROVIDER_CONFIG")]
    provider_config: Option<PathBuf>,

    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Archive raw source responses into this directory
    #[arg(long)]
    response_dir: Option<PathBuf>,

    /// Print per-source statistics after each domain
    #[arg(long)]
    stats: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only print results
    #[arg(long)]
    silent: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.silent {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lonkero_recon={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("lonkero-recon")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let registry = SourceRegistry::with_default_sources()?;

    if cli.list_sources {
        print_sources(&registry);
        return Ok(());
    }

    if !cli.silent {
        print_banner();
    }

    let config = build_config(&cli)?;
    for warning in ConfigValidator::check_sources(&config, &registry).warnings {
        warn!("{}", warning);
    }

    load_provider_keys(&cli, &registry)?;

    let agent = Agent::new(&registry, &config.sources.selection())?;
    let session_config = config.run.session_config();

    let domains = collect_domains(&cli)?;
    if domains.is_empty() {
        return Err(anyhow::anyhow!("No target domain given, use --domain or --list"));
    }

    let root = CancellationToken::new();
    let signal_token = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping all sources");
            signal_token.cancel();
        }
    });

    let writer = OutputWriter::new(cli.json);
    let mut output_file = match &cli.output {
        Some(path) => Some(writer.create_file(path, false)?),
        None => None,
    };

    for domain in &domains {
        if root.is_cancelled() {
            break;
        }

        let started = Instant::now();
        let enumeration = agent.enumerate(domain, &session_config, root.clone())?;
        let results = ResultCollector::new(domain).collect(enumeration).await;

        info!(
            "Found {} subdomains for {} in {}",
            results.len(),
            results.domain,
            format_duration(started.elapsed())
        );

        let stdout = std::io::stdout();
        if cli.collect_sources {
            writer.write_sources(&results, stdout.lock())?;
        } else {
            writer.write_hosts(&results, stdout.lock())?;
        }

        if let Some(file) = output_file.as_mut() {
            if cli.collect_sources {
                writer.write_sources(&results, &mut *file)?;
            } else {
                writer.write_hosts(&results, &mut *file)?;
            }
        }

        if cli.stats {
            eprintln!();
            eprint!("{}", render_statistics(&agent.statistics()));
            eprintln!();
        }
    }

    if let Some(path) = &cli.output {
        info!("Results written to {}", path.display());
    }
    Ok(())
}

/// Config file (or environment alone), then command-line overrides
fn build_config(cli: &Cli) -> Result<ReconConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(path)?.load_config()?,
        None => load_from_env()?,
    };

    if let Some(timeout) = cli.timeout {
        config.run.request_timeout_secs = timeout;
    }
    if let Some(max_time) = cli.max_time {
        config.run.max_enumeration_mins = max_time;
    }
    if let Some(rate_limit) = cli.rate_limit {
        config.run.rate_limit = Some(rate_limit);
    }
    if let Some(dir) = &cli.response_dir {
        config.run.response_dir = Some(dir.clone());
    }

    if !cli.sources.is_empty() {
        config.sources.include = cli.sources.clone();
    }
    if !cli.exclude_sources.is_empty() {
        config.sources.exclude = cli.exclude_sources.clone();
    }
    config.sources.all |= cli.all;
    config.sources.recursive |= cli.recursive;

    ConfigValidator::validate_recon_config(&config)?;
    Ok(config)
}

fn load_provider_keys(cli: &Cli, registry: &SourceRegistry) -> Result<()> {
    let mut keys = match &cli.provider_config {
        Some(path) if path.exists() => ProviderKeys::load(path)?,
        Some(path) => {
            write_provider_template(path, registry)?;
            ProviderKeys::new()
        }
        None => ProviderKeys::new(),
    };
    keys.merge_env(registry, |var| std::env::var(var).ok());

    let configured = keys.apply_to(registry);
    debug!("API keys configured for {} source(s)", configured);
    Ok(())
}

fn write_provider_template(path: &Path, registry: &SourceRegistry) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, ProviderKeys::template(registry)?)
        .with_context(|| format!("Failed to write provider config {}", path.display()))?;
    info!("Created provider config template at {}", path.display());
    Ok(())
}

fn collect_domains(cli: &Cli) -> Result<Vec<String>> {
    let mut domains: Vec<String> = cli
        .domain
        .iter()
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();

    if let Some(path) = &cli.list {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read domain list {}", path.display()))?;
        domains.extend(
            content
                .lines()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        );
    }

    let mut seen = std::collections::HashSet::new();
    domains.retain(|d| seen.insert(d.clone()));
    Ok(domains)
}

fn print_sources(registry: &SourceRegistry) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "Current list of available sources. [{}]", registry.len());
    let _ = writeln!(
        out,
        "Sources marked with an * need key(s) or token(s) to work.\nSources marked with a ~ are not used by default.\n"
    );
    for source in registry.all() {
        let _ = writeln!(
            out,
            "{}{}{}",
            source.name(),
            if source.needs_key() { " *" } else { "" },
            if source.is_default() { "" } else { " ~" }
        );
    }
}

fn print_banner() {
    eprint!("\x1b[92m");
    eprintln!("   __                __");
    eprintln!("  / /   ____  ____  / /_____  _________");
    eprintln!(" / /   / __ \\/ __ \\/ //_/ _ \\/ ___/ __ \\");
    eprint!("\x1b[91m");
    eprintln!(" / /___/ /_/ / / / / ,< /  __/ /  / /_/ /");
    eprintln!("/_____/\\____/_/ /_/_/|_|\\___/_/   \\____/");
    eprint!("\x1b[0m");
    eprintln!();
    eprint!("\x1b[1m\x1b[97m");
    eprintln!("        recon - passive subdomain discovery");
    eprint!("\x1b[0m");
    eprintln!();
}
