//! Sync planning: three-way diff of local files against resolved names.
//!
//! Exclusion rules only protect local files from deletion; they never keep a
//! resolved file from being fetched.

use indicatif::ProgressBar;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::pool::run_bounded;
use crate::resolve::ResolvedFile;

/// Names of regular files directly in `dir` whose extension is `extension`.
pub fn list_local(dir: &Path, extension: &str) -> Result<BTreeSet<String>, SyncError> {
    let listing_err = |source| SyncError::Listing {
        dir: dir.to_path_buf(),
        source,
    };
    let mut names = BTreeSet::new();
    for dirent in std::fs::read_dir(dir).map_err(listing_err)? {
        let dirent = dirent.map_err(listing_err)?;
        if !dirent.file_type().map_err(listing_err)?.is_file() {
            continue;
        }
        let path = dirent.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        match dirent.file_name().into_string() {
            Ok(name) => {
                names.insert(name);
            }
            Err(raw) => tracing::warn!(name = ?raw, "skipping non-UTF-8 file name"),
        }
    }
    Ok(names)
}

/// What happened to one entry in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Not present locally; scheduled for fetching.
    Fetched,
    /// Pinned and already present, even if the catalog has something newer.
    KeptBack,
    /// Already present.
    UpToDate,
}

/// Disjoint keep/delete/fetch sets of canonical file names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub keep: BTreeSet<String>,
    pub delete: BTreeSet<String>,
    pub fetch: BTreeSet<String>,
}

impl SyncPlan {
    pub fn compute(
        local: &BTreeSet<String>,
        resolved: &BTreeSet<String>,
        exclusions: &[Regex],
    ) -> Self {
        let mut plan = SyncPlan::default();
        for name in local {
            if resolved.contains(name) || exclusions.iter().any(|rule| rule.is_match(name)) {
                plan.keep.insert(name.clone());
            } else {
                plan.delete.insert(name.clone());
            }
        }
        plan.fetch = resolved.difference(local).cloned().collect();
        plan
    }

    /// True when applying the plan changes nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty() && self.fetch.is_empty()
    }

    pub fn outcome(&self, file: &ResolvedFile) -> EntryOutcome {
        if self.fetch.contains(&file.file_name) {
            EntryOutcome::Fetched
        } else if file.is_pinned() {
            EntryOutcome::KeptBack
        } else {
            EntryOutcome::UpToDate
        }
    }
}

/// Removes every member of `plan.delete` from `dir`. Returns the deleted names in order.
pub async fn apply_deletions(
    dir: &Path,
    plan: &SyncPlan,
    workers: usize,
    progress: &ProgressBar,
) -> Result<Vec<String>, SyncError> {
    if plan.delete.is_empty() {
        return Ok(Vec::new());
    }
    tracing::info!(count = plan.delete.len(), "deleting unwanted files");
    let dir: PathBuf = dir.to_path_buf();
    run_bounded(plan.delete.iter().cloned(), workers, progress, |name| {
        let path = dir.join(&name);
        async move {
            tracing::debug!(file = %name, "deleting");
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(name),
                Err(source) => Err(SyncError::DeletionFailed { file: name, source }),
            }
        }
    })
    .await
}
