//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Hoover - inventory aggregation across foundations
///
/// Queries every configured foundation's snapshot endpoints concurrently
/// and prints the merged inventory. Unreachable foundations contribute
/// nothing instead of failing the run.
///
/// Examples:
///   hoover summary
///   hoover detail --config ./hoover.toml --output snapshot.json
///   hoover applications --format csv --output apps.csv
///   hoover user-accounts --timeout 30
///   hoover --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Which report to assemble
    #[arg(value_enum, required_unless_present = "init_config")]
    pub report: Option<ReportKind>,

    /// Path to configuration file
    ///
    /// If not specified, looks for hoover.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "HOOVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file path (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, csv)
    ///
    /// CSV is available for the applications and service-instances reports.
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Per-foundation request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum foundations queried at once
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Skip TLS certificate validation for snapshot requests
    #[arg(long)]
    pub skip_ssl_validation: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default hoover.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    /// Full merged snapshot detail
    Detail,
    /// Summed application and service instance counts
    Summary,
    Applications,
    ServiceInstances,
    Relationships,
    UserAccounts,
    ServiceAccounts,
}

impl ReportKind {
    /// Whether the report can be rendered as CSV.
    pub fn supports_csv(&self) -> bool {
        matches!(self, ReportKind::Applications | ReportKind::ServiceInstances)
    }
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// CSV format
    Csv,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.format == OutputFormat::Csv {
            match self.report {
                Some(kind) if kind.supports_csv() => {}
                _ => {
                    return Err(
                        "CSV output is only available for applications and service-instances"
                            .to_string(),
                    )
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over `verbose = true` in the config file.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
