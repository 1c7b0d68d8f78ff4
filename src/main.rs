//! Sprint Update - periodic status report generator
//!
//! # Run Sequence
//! 1. Parse flags and initialize tracing
//! 2. Load configuration from the environment, apply flag overrides
//! 3. Open the report cache and fetch the report through it
//! 4. Close the cache and print the report
//! 5. Ask how to copy the report and deliver it to the clipboard

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sprint_update::delivery::{FixedChoice, TerminalPrompt};
use sprint_update::{
    fetch_cached, CacheStore, CommandReportSource, Config, DeliveryPrompt, Memoizer,
    ReportWindow, SystemClipboard, SystemClock,
};

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red(), err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only the report. `RUST_LOG`
/// overrides the verbosity flags.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.apply(Config::from_env());
    info!(
        "Configuration loaded: cache_file={}, ttl_ms={}, window_days={}",
        config.cache_file().display(),
        config.cache_ttl_ms,
        config.window_days
    );

    let today = Local::now().date_naive();
    let window = ReportWindow::resolve(cli.from, cli.to, today, config.window_days)?;
    let source = CommandReportSource::new(config.report_command.clone());

    let report = fetch_report(&config, &source, &window, cli.refresh)
        .await
        .context("Failed to generate report")?;
    println!("{}", report);

    let clipboard = SystemClipboard::new();
    debug!(platform = %clipboard.platform(), "Clipboard ready");
    let choice = match cli.copy {
        Some(choice) => DeliveryPrompt::new(clipboard, FixedChoice(choice)).run(&report).await,
        None => DeliveryPrompt::new(clipboard, TerminalPrompt).run(&report).await,
    }
    .context("Failed to copy report")?;

    if let Some(message) = choice.confirmation() {
        println!("{}", message.green());
    }
    Ok(())
}

/// Fetches the report through the cache. The cache is closed before the
/// result is inspected, so a failed fetch still persists earlier changes.
async fn fetch_report(
    config: &Config,
    source: &CommandReportSource,
    window: &ReportWindow,
    refresh: bool,
) -> Result<String, sprint_update::error::ReportError> {
    let store = CacheStore::open(config.cache_file(), Arc::new(SystemClock)).await;
    let mut memo = Memoizer::new(store);

    let report = fetch_cached(&mut memo, source, window, config.cache_ttl(), refresh).await;
    memo.close().await;
    report
}
