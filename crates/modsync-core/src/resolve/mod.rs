//! Catalog resolution: map every listfile entry to exactly one remote file.
//!
//! ID entries are looked up in a single batch request, then each record's
//! best file is selected on a bounded worker pool (falling back to the full
//! file list when the record's latest files don't satisfy the entry). URL
//! entries are looked up one request per entry on the same pool.

mod select;

use indicatif::ProgressBar;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::task::JoinError;

use crate::catalog::{CatalogError, CatalogRecord, CatalogService, KnownFile};
use crate::channel::Channel;
use crate::listfile::{Entry, EntryKey, Selector, VersionConstraint};
use crate::pool::run_bounded;

pub use select::find_latest_matching;

/// Where a resolved file can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// URL of the binary itself.
    Direct(String),
    /// URL of the file's web page (`.../files/<id>`).
    FilePage(String),
}

impl Locator {
    /// URL that serves the file's bytes. File pages map `/files/<id>` to `/download/<id>`.
    pub fn direct_url(&self) -> String {
        match self {
            Locator::Direct(url) => url.clone(),
            Locator::FilePage(url) => match url.rfind("/files/") {
                Some(at) => format!("{}/download/{}", &url[..at], &url[at + "/files/".len()..]),
                None => url.clone(),
            },
        }
    }
}

/// The concrete file chosen for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub entry: Entry,
    /// Human-readable project name.
    pub title: String,
    /// Canonical local file name; the join key with the target directory.
    pub file_name: String,
    pub file_id: u64,
    pub locator: Locator,
    pub uploaded_at: OffsetDateTime,
    pub channel: Channel,
}

impl ResolvedFile {
    fn new(entry: Entry, title: String, file: KnownFile, page: bool) -> Self {
        let file_name = file.canonical_name();
        let locator = if page {
            Locator::FilePage(file.download_url)
        } else {
            Locator::Direct(file.download_url)
        };
        Self {
            entry,
            title,
            file_name,
            file_id: file.id,
            locator,
            uploaded_at: file.uploaded_at,
            channel: file.channel,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.entry.is_pinned()
    }
}

/// Resolved files in listfile order, unique by canonical name.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    files: Vec<ResolvedFile>,
}

impl ResolvedSet {
    /// Builds the set from per-entry results, rejecting two entries that resolve to one file name.
    pub fn from_files(files: Vec<ResolvedFile>) -> Result<Self, ResolveError> {
        let mut set = ResolvedSet::default();
        for file in files {
            set.insert(file)?;
        }
        Ok(set)
    }

    fn insert(&mut self, file: ResolvedFile) -> Result<(), ResolveError> {
        if let Some(existing) = self.get(&file.file_name) {
            return Err(ResolveError::ConflictingFile {
                file: file.file_name.clone(),
                first: existing.entry.key.to_string(),
                second: file.entry.key.to_string(),
            });
        }
        self.files.push(file);
        Ok(())
    }

    pub fn get(&self, file_name: &str) -> Option<&ResolvedFile> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.files.iter().map(|f| f.file_name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(
        "couldn't find a download for {name} ({entry}) that satisfies: \
         game version {version}, {selector}"
    )]
    NoMatchingFile {
        name: String,
        entry: String,
        version: String,
        selector: Selector,
    },

    #[error("catalog returned no record for project {0}")]
    MissingRecord(u64),

    #[error("{first} and {second} both resolve to {file}")]
    ConflictingFile {
        file: String,
        first: String,
        second: String,
    },

    #[error("resolver worker failed")]
    Join(#[from] JoinError),
}

/// One unit of per-entry work.
enum Job {
    Record(Entry, CatalogRecord),
    Url(Entry, String),
}

/// Resolves every entry against `service`.
///
/// Fails fast: the first entry that cannot be resolved ends the run with no partial result.
pub async fn resolve(
    service: Arc<dyn CatalogService>,
    entries: &[Entry],
    version: &VersionConstraint,
    workers: usize,
    progress: &ProgressBar,
) -> Result<ResolvedSet, ResolveError> {
    let ids: Vec<u64> = entries.iter().filter_map(|e| e.key.as_id()).collect();
    let mut records = if ids.is_empty() {
        HashMap::new()
    } else {
        batch_lookup(Arc::clone(&service), ids).await?
    };

    let mut jobs = Vec::with_capacity(entries.len());
    for entry in entries {
        let job = match &entry.key {
            EntryKey::Id(id) => {
                let record = records.remove(id).ok_or(ResolveError::MissingRecord(*id))?;
                Job::Record(entry.clone(), record)
            }
            EntryKey::Url(url) => Job::Url(entry.clone(), url.clone()),
        };
        jobs.push(job);
    }

    tracing::info!(entries = jobs.len(), workers, "resolving entries");
    let files = run_bounded(jobs, workers, progress, |job| {
        let service = Arc::clone(&service);
        let version = version.clone();
        async move {
            tokio::task::spawn_blocking(move || resolve_job(service.as_ref(), job, &version))
                .await
                .unwrap_or_else(|err| Err(ResolveError::Join(err)))
        }
    })
    .await?;

    ResolvedSet::from_files(files)
}

async fn batch_lookup(
    service: Arc<dyn CatalogService>,
    ids: Vec<u64>,
) -> Result<HashMap<u64, CatalogRecord>, ResolveError> {
    tracing::info!(count = ids.len(), "fetching info about {} projects", ids.len());
    let records = tokio::task::spawn_blocking(move || service.lookup_many(&ids)).await??;
    Ok(records.into_iter().map(|r| (r.id, r)).collect())
}

fn resolve_job(
    service: &dyn CatalogService,
    job: Job,
    version: &VersionConstraint,
) -> Result<ResolvedFile, ResolveError> {
    match job {
        Job::Record(entry, record) => resolve_record(service, entry, record, version),
        Job::Url(entry, url) => {
            let record = service.lookup_url(&url, version)?;
            let file = record.file.ok_or_else(|| ResolveError::NoMatchingFile {
                name: record.title.clone(),
                entry: url.clone(),
                version: version.to_string(),
                selector: entry.selector,
            })?;
            tracing::debug!(entry = %url, file = %file.file_name, "resolved");
            Ok(ResolvedFile::new(entry, record.title, file, true))
        }
    }
}

fn resolve_record(
    service: &dyn CatalogService,
    entry: Entry,
    record: CatalogRecord,
    version: &VersionConstraint,
) -> Result<ResolvedFile, ResolveError> {
    if let Some(file) = find_latest_matching(&record.files, version, &entry.selector) {
        tracing::debug!(entry = %entry.key, file = %file.file_name, "resolved from latest files");
        let file = file.clone();
        return Ok(ResolvedFile::new(entry, record.name, file, false));
    }

    tracing::debug!(entry = %entry.key, "no match in latest files, fetching full file list");
    let files = service.list_files(record.id)?;
    match find_latest_matching(&files, version, &entry.selector) {
        Some(file) => {
            tracing::debug!(entry = %entry.key, file = %file.file_name, "resolved from full file list");
            let file = file.clone();
            Ok(ResolvedFile::new(entry, record.name, file, false))
        }
        None => Err(ResolveError::NoMatchingFile {
            name: record.name,
            entry: entry.key.to_string(),
            version: version.to_string(),
            selector: entry.selector,
        }),
    }
}
