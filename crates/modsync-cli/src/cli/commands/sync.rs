//! `modsync sync` – delete unwanted mods and fetch missing ones.

use anyhow::Result;
use modsync_core::catalog::HttpCatalog;
use modsync_core::config::ModsyncConfig;
use modsync_core::fetch::FetchMode;
use modsync_core::http::HttpClient;
use modsync_core::plan::EntryOutcome;
use modsync_core::progress::Progress;
use modsync_core::sync::{self, SyncOptions, SyncReport};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncFlags {
    pub browser: bool,
    pub show_up_to_date: bool,
    pub hide_kept_back: bool,
}

pub async fn run_sync(cfg: &ModsyncConfig, opts: &SyncOptions, flags: SyncFlags) -> Result<()> {
    let service = Arc::new(HttpCatalog::from_config(cfg));
    let mode = if flags.browser {
        FetchMode::Browser
    } else {
        FetchMode::Download
    };
    let sink = mode.sink(HttpClient::new(&cfg.http));
    let progress = Progress::stderr();

    let mut prepared = sync::prepare(opts, service, progress).await?;
    // Announce removals before they happen; a later fetch failure must not hide them.
    for line in deletion_lines(&prepared.report) {
        println!("{line}");
    }
    prepared.delete(opts, progress).await?;
    let report = prepared.fetch(opts, sink, progress).await?;
    for line in report_lines(&report, flags) {
        println!("{line}");
    }
    Ok(())
}

/// Listfile warnings and one line per planned removal.
pub(crate) fn deletion_lines(report: &SyncReport) -> Vec<String> {
    report
        .warnings
        .iter()
        .map(|w| format!("warning: {w}"))
        .chain(report.plan.delete.iter().map(|name| format!("Deleting {name}")))
        .collect()
}

/// Per-entry outcome lines and the closing summary.
pub(crate) fn report_lines(report: &SyncReport, flags: SyncFlags) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &report.entries {
        match entry.outcome {
            EntryOutcome::Fetched if flags.browser => {
                lines.push(format!("⤓ Opened {} ({}) in the browser", entry.title, entry.file_name))
            }
            EntryOutcome::Fetched => {
                lines.push(format!("⤓ Downloaded {} ({})", entry.title, entry.file_name))
            }
            EntryOutcome::KeptBack if !flags.hide_kept_back => {
                lines.push(format!("← {} has been kept back.", entry.title))
            }
            EntryOutcome::UpToDate if flags.show_up_to_date => {
                lines.push(format!("→ {} is up to date.", entry.title))
            }
            _ => {}
        }
    }

    lines.push(format!(
        "Deleted {}, fetched {}, {} already present.",
        report.deleted.len(),
        report.fetched.len(),
        report.entries.len().saturating_sub(report.fetched.len())
    ));
    lines
}
