//! Command-line arguments

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use sprint_update::{Config, DeliveryChoice};

#[derive(Debug, Parser)]
#[command(
    name = "sprint-update",
    version,
    about = "Sprint Update Generator",
    long_about = "Prints the sprint update report for a date range and offers to copy it \
                  to the clipboard. Reports are cached for an hour per date range."
)]
pub struct Cli {
    /// Start date (YYYY-MM-DD), defaults to the window length before --to
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Command that prints the report (overrides SPRINT_UPDATE_REPORT_CMD)
    #[arg(long, value_name = "CMD")]
    pub report_cmd: Option<String>,

    /// Cache directory (overrides SPRINT_UPDATE_CACHE_DIR)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Report cache TTL in milliseconds (overrides SPRINT_UPDATE_CACHE_TTL_MS)
    #[arg(long, value_name = "MS")]
    pub ttl_ms: Option<u64>,

    /// Ignore any cached report for this date range
    #[arg(long)]
    pub refresh: bool,

    /// Skip the menu: rich, markdown or none
    #[arg(long, value_name = "MODE", value_parser = parse_choice)]
    pub copy: Option<DeliveryChoice>,
}

impl Cli {
    /// Default tracing filter for the selected verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "sprint_update=debug"
        } else if self.verbose {
            "sprint_update=info"
        } else {
            "sprint_update=warn"
        }
    }

    /// Applies flag overrides on top of the environment configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(ttl) = self.ttl_ms {
            config.cache_ttl_ms = ttl;
        }
        if let Some(cmd) = &self.report_cmd {
            config.report_command = Some(cmd.clone());
        }
        config
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

fn parse_choice(s: &str) -> Result<DeliveryChoice, String> {
    s.parse()
}
