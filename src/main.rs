//! Hoover - inventory aggregation across foundations
//!
//! A CLI that queries every configured foundation's snapshot endpoints
//! and prints the merged inventory as JSON or CSV.
//!
//! Exit codes:
//!   0 - Success (including foundations that were unreachable)
//!   1 - Configuration or output error

use anyhow::{Context, Result};
use hoover::cli::{Args, OutputFormat, ReportKind};
use hoover::config::{Config, DEFAULT_CONFIG_FILE};
use hoover::report;
use hoover::SnapshotClient;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging so `general.verbose` can set the level
    let config_path = args.config.clone().or_else(Config::default_path);
    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("Hoover v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_path {
        Some(ref path) => info!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run(args, config).await {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default hoover.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    eprintln!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    eprintln!("Add your foundations under [foundations].");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging(args: &Args, config: &Config) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level(config.general.verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Assemble the requested report and write it out.
async fn run(args: Args, mut config: Config) -> Result<()> {
    let start_time = Instant::now();

    config.merge_with_args(&args);
    config.validate()?;

    if config.foundations.is_empty() {
        warn!("No foundations configured; the report will be empty");
    }

    let client = SnapshotClient::from_config(&config)?;
    let kind = args.report.context("No report selected")?;

    let output = render(&client, kind, args.format).await?;

    match args.output {
        Some(ref path) => {
            report::write_report(&output, path)?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", output),
    }

    info!(
        "Assembled {:?} from {} foundations in {:.1}s",
        kind,
        config.foundations.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

async fn render(client: &SnapshotClient, kind: ReportKind, format: OutputFormat) -> Result<String> {
    match (kind, format) {
        (ReportKind::Applications, OutputFormat::Csv) => Ok(client.assemble_csv_ai_report().await),
        (ReportKind::ServiceInstances, OutputFormat::Csv) => {
            Ok(client.assemble_csv_si_report().await)
        }
        (_, OutputFormat::Csv) => anyhow::bail!("CSV output is not available for {:?}", kind),
        (ReportKind::Detail, _) => {
            report::generate_json_report(&client.assemble_snapshot_detail().await)
        }
        (ReportKind::Summary, _) => {
            report::generate_json_report(&client.assemble_snapshot_summary().await)
        }
        (ReportKind::Applications, _) => {
            report::generate_json_report(&client.assemble_application_detail().await)
        }
        (ReportKind::ServiceInstances, _) => {
            report::generate_json_report(&client.assemble_service_instance_detail().await)
        }
        (ReportKind::Relationships, _) => {
            report::generate_json_report(&client.assemble_application_relationships().await)
        }
        (ReportKind::UserAccounts, _) => {
            report::generate_json_report(&client.assemble_user_accounts().await)
        }
        (ReportKind::ServiceAccounts, _) => {
            report::generate_json_report(&client.assemble_service_accounts().await)
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}
