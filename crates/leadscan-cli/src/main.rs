use anyhow::Context;
use clap::{Parser, Subcommand};
use leadscan_browser::BrowserEngine;
use leadscan_core::{AppConfig, SearchUnit};
use leadscan_scanner::{DiscoveryOrchestrator, ScanState, ScanSummary};
use leadscan_store::{export_contacts, load_zones, DedupIndex, LeadSink, ProgressLedger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "leadscan", version)]
#[command(about = "Resumable business lead discovery on map search")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "LEADSCAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every zone for every category, resuming from the progress ledger
    Scan {
        /// Zones CSV, overriding `paths.zone_file`
        #[arg(long)]
        zones: Option<PathBuf>,
        /// Leads CSV, overriding `paths.output_file`
        #[arg(long)]
        output: Option<PathBuf>,
        /// Progress ledger, overriding `paths.progress_file`
        #[arg(long)]
        progress: Option<PathBuf>,
        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },
    /// Write the distinct 10-digit contacts of the leads file
    ExportContacts {
        /// Leads CSV, overriding `paths.output_file`
        #[arg(long)]
        input: Option<PathBuf>,
        /// Contacts CSV, overriding `paths.contacts_file`
        #[arg(long)]
        output: Option<PathBuf>,
        /// Prefix added to every number
        #[arg(long, default_value = "+91")]
        country_code: String,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Also save it to the configuration file
        #[arg(long)]
        write: bool,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,leadscan=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config =
        AppConfig::load_with_env(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Scan {
            zones,
            output,
            progress,
            headed,
        } => {
            if let Some(path) = zones {
                config.paths.zone_file = path;
            }
            if let Some(path) = output {
                config.paths.output_file = path;
            }
            if let Some(path) = progress {
                config.paths.progress_file = path;
            }
            if headed {
                config.browser.headless = false;
            }

            let summary = run_scan(&config).await?;
            print_summary(&summary);
        }
        Commands::ExportContacts {
            input,
            output,
            country_code,
        } => {
            let input = input.unwrap_or(config.paths.output_file);
            let output = output.unwrap_or(config.paths.contacts_file);
            let count = export_contacts(&input, &output, &country_code)
                .with_context(|| format!("failed to export contacts from {}", input.display()))?;
            println!("Wrote {count} contacts to {}", output.display());
        }
        Commands::Config { write } => {
            print!("{}", config.to_toml()?);
            if write {
                let path = match &cli.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                eprintln!("Saved configuration to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Load every input, then scan. Setup errors abort before the browser starts.
async fn run_scan(config: &AppConfig) -> anyhow::Result<ScanSummary> {
    let zones = load_zones(&config.paths.zone_file).context("failed to load zones")?;
    let categories: Vec<String> = config
        .search
        .categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    let units = SearchUnit::plan(&zones, &categories);
    info!(
        zones = zones.len(),
        categories = categories.len(),
        units = units.len(),
        "planned search units"
    );

    let ledger =
        ProgressLedger::open(&config.paths.progress_file).context("failed to open progress ledger")?;
    let dedup = DedupIndex::bootstrap(&config.paths.output_file, config.search.dedup_policy);
    let sink = LeadSink::open(&config.paths.output_file).context("failed to open leads file")?;
    let mut state = ScanState::new(dedup, ledger, sink);

    let engine = Arc::new(
        BrowserEngine::launch(&config.browser)
            .await
            .context("failed to launch browser")?,
    );
    let orchestrator = DiscoveryOrchestrator::new(engine.clone(), config)?;

    let summary = orchestrator.run(&units, &mut state).await;

    drop(orchestrator);
    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.shutdown().await {
                warn!("browser shutdown failed: {}", e);
            }
        }
        Err(_) => warn!("browser still in use, skipping shutdown"),
    }

    Ok(summary)
}

fn print_summary(summary: &ScanSummary) {
    let elapsed = summary
        .finished_at
        .map(|end| end - summary.started_at)
        .map_or(0, |d| d.num_seconds());

    println!("Discovery complete in {elapsed}s");
    println!("  searched:     {}", summary.attempted());
    println!("  with leads:   {}", summary.with_leads);
    println!("  empty:        {}", summary.empty);
    println!("  failed:       {}", summary.failed);
    println!("  skipped:      {}", summary.skipped);
    println!("  leads saved:  {}", summary.leads_written);
}
