//! `modsync plan` – resolve and show the plan without touching the directory.

use anyhow::Result;
use modsync_core::catalog::HttpCatalog;
use modsync_core::config::ModsyncConfig;
use modsync_core::fetch::FetchMode;
use modsync_core::http::HttpClient;
use modsync_core::plan::EntryOutcome;
use modsync_core::progress::Progress;
use modsync_core::sync::{self, SyncOptions, SyncReport};
use std::sync::Arc;

pub async fn run_plan(cfg: &ModsyncConfig, opts: &SyncOptions) -> Result<()> {
    let service = Arc::new(HttpCatalog::from_config(cfg));
    // Never invoked on a dry run.
    let sink = FetchMode::Download.sink(HttpClient::new(&cfg.http));
    let report = sync::run_sync(opts, service, sink, Progress::stderr()).await?;
    for line in plan_lines(&report) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn plan_lines(report: &SyncReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .warnings
        .iter()
        .map(|w| format!("warning: {w}"))
        .collect();
    if report.plan.is_noop() {
        lines.push("Nothing to do.".to_string());
        return lines;
    }
    lines.extend(report.plan.delete.iter().map(|name| format!("delete {name}")));
    lines.extend(
        report
            .entries
            .iter()
            .filter(|e| e.outcome == EntryOutcome::Fetched)
            .map(|e| format!("fetch  {} ({})", e.file_name, e.title)),
    );
    lines.extend(
        report
            .entries
            .iter()
            .filter(|e| e.outcome == EntryOutcome::KeptBack)
            .map(|e| format!("keep   {} ({}, pinned)", e.file_name, e.title)),
    );
    lines
}
