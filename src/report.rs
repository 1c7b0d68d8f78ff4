//! Report Source
//!
//! The report itself is produced by an external command. This module defines
//! the window a report covers, its cache key, and the command runner.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::cache::{Codec, Memoizer};
use crate::error::ReportError;

/// Environment variable carrying the window start to the report command
pub const FROM_ENV: &str = "SPRINT_UPDATE_FROM";

/// Environment variable carrying the window end to the report command
pub const TO_ENV: &str = "SPRINT_UPDATE_TO";

// == Report Window ==
/// Inclusive date range covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Creates a window, rejecting a start after the end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Window of `days` days ending at `end`.
    pub fn ending(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Resolves optional CLI dates: `to` defaults to `today`, `from` to
    /// `days` before `to`.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
        days: u32,
    ) -> Result<Self, ReportError> {
        let end = to.unwrap_or(today);
        match from {
            Some(start) => Self::new(start, end),
            None => Ok(Self::ending(end, days)),
        }
    }

    /// Cache key covering every input of the report, e.g.
    /// `report:2024-01-01:2024-01-14`.
    pub fn cache_key(&self) -> String {
        format!("report:{}:{}", self.start, self.end)
    }
}

// == Report Source ==
/// Produces the report for a window.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch(&self, window: &ReportWindow) -> Result<String, ReportError>;
}

/// Runs a shell command line and returns its stdout as the report.
///
/// The window is passed as `SPRINT_UPDATE_FROM` / `SPRINT_UPDATE_TO`
/// (`YYYY-MM-DD`).
#[derive(Debug, Clone)]
pub struct CommandReportSource {
    command: Option<String>,
}

impl CommandReportSource {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
        }
    }

    fn shell(command: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }
}

#[async_trait]
impl ReportSource for CommandReportSource {
    async fn fetch(&self, window: &ReportWindow) -> Result<String, ReportError> {
        let command = self.command.as_deref().ok_or(ReportError::NotConfigured)?;
        debug!(command = %command, from = %window.start, to = %window.end, "Fetching report");

        let output = Self::shell(command)
            .env(FROM_ENV, window.start.to_string())
            .env(TO_ENV, window.end.to_string())
            .output()
            .await
            .map_err(|e| ReportError::Spawn {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!(command = %command, exit_code = code, "Report command failed");
            return Err(ReportError::Failed {
                command: command.to_string(),
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report = String::from_utf8(output.stdout).map_err(|_| ReportError::InvalidOutput {
            command: command.to_string(),
        })?;
        Ok(report.trim().to_string())
    }
}

// == Cached Fetch ==
/// Fetches the report for `window` through the cache, keyed by
/// [`ReportWindow::cache_key`].
///
/// With `refresh` set the cached report is not read; it is replaced only if
/// the fetch succeeds, so a failed refresh keeps the previous report.
pub async fn fetch_cached<C, S>(
    memo: &mut Memoizer<C>,
    source: &S,
    window: &ReportWindow,
    ttl: Duration,
    refresh: bool,
) -> Result<String, ReportError>
where
    C: Codec,
    S: ReportSource + ?Sized,
{
    let key = window.cache_key();
    let fetch = || source.fetch(window);
    if refresh {
        info!(key = %key, "Refreshing cached report");
        memo.refresh(&key, ttl, fetch).await
    } else {
        memo.autocache(&key, ttl, fetch).await
    }
}
