//! One sync run: parse → resolve → delete pass → fetch pass.
//!
//! Phases are strictly sequential; each one fans out over the worker pool and
//! the first error ends the run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::error::SyncError;
use crate::fetch::{self, FileSink};
use crate::listfile::{self, Directives, ListFormat, VersionConstraint};
use crate::plan::{self, EntryOutcome, SyncPlan};
use crate::progress::Progress;
use crate::resolve::{self, ResolvedFile};

/// Prefix of a listfile path that is relative to the target directory.
pub const DIR_PLACEHOLDER: &str = "%dir/";

/// Default listfile location.
pub const DEFAULT_LISTFILE: &str = "%dir/mods.txt";

/// Expands a leading `%dir/` in `raw` to `dir`.
pub fn resolve_listfile_path(dir: &Path, raw: &str) -> PathBuf {
    match raw.strip_prefix(DIR_PLACEHOLDER) {
        Some(rest) => dir.join(rest),
        None => PathBuf::from(raw),
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Target directory.
    pub dir: PathBuf,
    /// Listfile path, already expanded.
    pub listfile: PathBuf,
    pub format: ListFormat,
    /// Extension of managed files, without the dot.
    pub extension: String,
    pub workers: usize,
    /// Resolve and plan only; touch nothing on disk.
    pub dry_run: bool,
}

/// Per-entry line of the run report, in listfile order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub title: String,
    pub file_name: String,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub version: VersionConstraint,
    pub plan: SyncPlan,
    /// Files actually removed (empty on a dry run).
    pub deleted: Vec<String>,
    /// Files actually delivered (empty on a dry run).
    pub fetched: Vec<String>,
    pub entries: Vec<EntryReport>,
    /// Non-fatal listfile remarks.
    pub warnings: Vec<String>,
}

/// Parses the listfile named by `opts`.
pub fn load_directives(opts: &SyncOptions) -> Result<Directives, SyncError> {
    tracing::info!(path = %opts.listfile.display(), "reading listfile");
    Ok(listfile::parse_file(&opts.listfile, &opts.format)?)
}

/// A resolved and planned run whose delete and fetch passes have not run yet.
///
/// Callers that report progress drive the passes themselves, so files removed
/// by the delete pass can be shown even if the fetch pass later fails.
#[derive(Debug)]
pub struct PreparedSync {
    pub report: SyncReport,
    pending: Vec<ResolvedFile>,
}

/// Parses the listfile, resolves every entry and plans the run. Touches nothing on disk.
pub async fn prepare(
    opts: &SyncOptions,
    service: Arc<dyn CatalogService>,
    progress: Progress,
) -> Result<PreparedSync, SyncError> {
    let directives = load_directives(opts)?;
    tracing::info!(
        entries = directives.entries.len(),
        exclusions = directives.exclusions.len(),
        version = %directives.version,
        "listfile parsed"
    );

    let bar = progress.phase("resolve", directives.entries.len());
    let resolved = resolve::resolve(
        service,
        &directives.entries,
        &directives.version,
        opts.workers,
        &bar,
    )
    .await?;
    bar.finish_and_clear();

    let local = plan::list_local(&opts.dir, &opts.extension)?;
    let sync_plan = SyncPlan::compute(&local, &resolved.names(), &directives.exclusions);
    tracing::info!(
        keep = sync_plan.keep.len(),
        delete = sync_plan.delete.len(),
        fetch = sync_plan.fetch.len(),
        "plan computed"
    );

    let entries = resolved
        .iter()
        .map(|file| EntryReport {
            title: file.title.clone(),
            file_name: file.file_name.clone(),
            outcome: sync_plan.outcome(file),
        })
        .collect();
    let pending = resolved
        .iter()
        .filter(|file| sync_plan.fetch.contains(&file.file_name))
        .cloned()
        .collect();

    Ok(PreparedSync {
        report: SyncReport {
            version: directives.version,
            plan: sync_plan,
            deleted: Vec::new(),
            fetched: Vec::new(),
            entries,
            warnings: directives.warnings,
        },
        pending,
    })
}

impl PreparedSync {
    /// Runs the delete pass. Returns the removed names.
    pub async fn delete(
        &mut self,
        opts: &SyncOptions,
        progress: Progress,
    ) -> Result<&[String], SyncError> {
        let bar = progress.phase("delete", self.report.plan.delete.len());
        self.report.deleted =
            plan::apply_deletions(&opts.dir, &self.report.plan, opts.workers, &bar).await?;
        bar.finish_and_clear();
        Ok(&self.report.deleted)
    }

    /// Runs the fetch pass and returns the finished report.
    pub async fn fetch(
        mut self,
        opts: &SyncOptions,
        sink: Arc<dyn FileSink>,
        progress: Progress,
    ) -> Result<SyncReport, SyncError> {
        let bar = progress.phase("fetch", self.pending.len());
        self.report.fetched = fetch::execute(&opts.dir, self.pending, sink, opts.workers, &bar).await?;
        bar.finish_and_clear();

        tracing::info!(
            deleted = self.report.deleted.len(),
            fetched = self.report.fetched.len(),
            "sync finished"
        );
        Ok(self.report)
    }
}

/// Runs a full sync of `opts.dir` against the listfile.
pub async fn run_sync(
    opts: &SyncOptions,
    service: Arc<dyn CatalogService>,
    sink: Arc<dyn FileSink>,
    progress: Progress,
) -> Result<SyncReport, SyncError> {
    let mut prepared = prepare(opts, service, progress).await?;
    if opts.dry_run {
        tracing::info!("dry run, leaving {} untouched", opts.dir.display());
        return Ok(prepared.report);
    }
    prepared.delete(opts, progress).await?;
    prepared.fetch(opts, sink, progress).await
}

impl SyncReport {
    /// File names of entries with the given outcome.
    pub fn with_outcome(&self, outcome: EntryOutcome) -> BTreeSet<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome == outcome)
            .map(|e| e.file_name.as_str())
            .collect()
    }
}
