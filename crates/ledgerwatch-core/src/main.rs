//! LedgerWatch CLI
//!
//! Checks every configured address once and exits.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ledgerwatch::alerting::{LogNotifier, Notifier, SendGridNotifier};
use ledgerwatch::collector::RunOptions;
use ledgerwatch::config::LoggingConfig;
use ledgerwatch::monitor::Monitor;
use ledgerwatch::{report, RunConfig};

/// LedgerWatch - low balance alerts for ledger addresses
#[derive(Parser)]
#[command(name = "ledgerwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "./config.yaml", env = "LEDGERWATCH_CONFIG")]
    config: PathBuf,

    /// Report every key and enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Look up one key at a time, pausing for enter after each
    #[arg(short, long)]
    debug: bool,

    /// Override the configured number of concurrent lookups
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log alerts instead of emailing them
    #[arg(long)]
    dry_run: bool,

    /// Report format
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional, loaded first so it can supply LEDGERWATCH_CONFIG
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match RunConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging, cli.verbose);

    match run(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run aborted");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: &Cli, config: RunConfig) -> anyhow::Result<()> {
    let options = RunOptions {
        verbose: cli.verbose,
        debug: cli.debug,
        concurrency: cli.concurrency.unwrap_or(config.concurrency),
    };

    let notifier: Box<dyn Notifier> = if cli.dry_run {
        info!("Dry run, alerts will only be logged");
        Box::new(LogNotifier)
    } else {
        Box::new(SendGridNotifier::from_env().context("cannot send alert emails")?)
    };

    info!(
        explorer = %config.explorer.name,
        keys = config.ltc_keys.len(),
        min_value = config.min_value,
        concurrency = options.effective_concurrency(),
        "Checking balances"
    );

    // alert lines go to stderr when stdout carries the JSON document
    let mut alert_out: Box<dyn Write + Send> = match cli.format {
        OutputFormat::Text => Box::new(std::io::stdout()),
        OutputFormat::Json => Box::new(std::io::stderr()),
    };

    let monitor = Monitor::new(config, options);
    let summary = monitor.run(notifier.as_ref(), alert_out.as_mut()).await?;

    let explorer = &monitor.config().explorer;
    match cli.format {
        OutputFormat::Text => {
            let text = report::render_text(explorer, &summary, cli.verbose);
            print!("{text}");
        }
        OutputFormat::Json => println!("{}", report::render_json(explorer, &summary)?),
    }

    Ok(())
}
