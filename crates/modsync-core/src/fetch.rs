//! Fetch executor: bring every file in the fetch set into the target directory.
//!
//! Downloads stream to `<name>.part` and are renamed on success; a failed
//! transfer removes its partial file. The browser variant only hands the
//! direct-download URL to the system opener.

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::error::SyncError;
use crate::http::{HttpClient, HttpError};
use crate::pool::run_bounded;
use crate::resolve::ResolvedFile;

/// Suffix of in-progress downloads.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't open {url} in a browser")]
    Opener {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Delivers one resolved file. Implementations block; the executor runs them
/// under `spawn_blocking`.
pub trait FileSink: Send + Sync {
    fn deliver(&self, dir: &Path, file: &ResolvedFile) -> Result<(), FetchError>;
}

/// How fetched files reach the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Download into the directory.
    #[default]
    Download,
    /// Open each download link in the system browser; the user saves the file.
    Browser,
}

impl FetchMode {
    pub fn sink(self, http: HttpClient) -> Arc<dyn FileSink> {
        match self {
            FetchMode::Download => Arc::new(DownloadSink::new(http)),
            FetchMode::Browser => Arc::new(BrowserSink::new(SystemOpener)),
        }
    }
}

/// Streams each file over HTTP into the target directory.
pub struct DownloadSink {
    http: HttpClient,
}

impl DownloadSink {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl FileSink for DownloadSink {
    fn deliver(&self, dir: &Path, file: &ResolvedFile) -> Result<(), FetchError> {
        let final_path = dir.join(&file.file_name);
        let part = temp_path(&final_path);
        let url = file.locator.direct_url();

        let result = (|| -> Result<(), FetchError> {
            let mut out = std::fs::File::create(&part).map_err(|source| FetchError::Io {
                path: part.clone(),
                source,
            })?;
            let bytes = self.http.download_to(&url, &mut out)?;
            out.sync_all().map_err(|source| FetchError::Io {
                path: part.clone(),
                source,
            })?;
            drop(out);
            std::fs::rename(&part, &final_path).map_err(|source| FetchError::Io {
                path: final_path.clone(),
                source,
            })?;
            tracing::debug!(file = %file.file_name, bytes, "downloaded");
            Ok(())
        })();

        if result.is_err() {
            if let Err(e) = std::fs::remove_file(&part) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %part.display(), error = %e, "couldn't remove partial download");
                }
            }
        }
        result
    }
}

/// Something that can show a URL to the user.
pub trait Opener: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Platform URL handler: `open` on macOS, `explorer`/`cmd start` on Windows, `xdg-open` elsewhere.
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        let spawned = if cfg!(target_os = "windows") {
            Command::new("explorer")
                .arg(url)
                .spawn()
                .or_else(|_| Command::new("cmd").args(["/C", "start", "", url]).spawn())
        } else if cfg!(target_os = "macos") {
            Command::new("open").arg(url).spawn()
        } else {
            Command::new("xdg-open").arg(url).spawn()
        };
        spawned.map(|_| ())
    }
}

/// Opens each file's direct-download URL instead of downloading it.
pub struct BrowserSink<O> {
    opener: O,
}

impl<O: Opener> BrowserSink<O> {
    pub fn new(opener: O) -> Self {
        Self { opener }
    }
}

impl<O: Opener> FileSink for BrowserSink<O> {
    fn deliver(&self, _dir: &Path, file: &ResolvedFile) -> Result<(), FetchError> {
        let url = file.locator.direct_url();
        tracing::debug!(file = %file.file_name, url = %url, "opening in browser");
        self.opener
            .open(&url)
            .map_err(|source| FetchError::Opener { url, source })
    }
}

/// Delivers every file through `sink`, at most `workers` at a time.
///
/// Returns the delivered file names in input order. The first failure is
/// returned; files completed before it stay on disk.
pub async fn execute(
    dir: &Path,
    files: Vec<ResolvedFile>,
    sink: Arc<dyn FileSink>,
    workers: usize,
    progress: &ProgressBar,
) -> Result<Vec<String>, SyncError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }
    tracing::info!(count = files.len(), workers, "fetching files");
    run_bounded(files, workers, progress, |file| {
        let sink = Arc::clone(&sink);
        let dir = dir.to_path_buf();
        async move {
            tokio::task::spawn_blocking(move || {
                sink.deliver(&dir, &file)
                    .map(|()| file.file_name.clone())
                    .map_err(|source| SyncError::FetchFailed {
                        file: file.file_name.clone(),
                        source,
                    })
            })
            .await?
        }
    })
    .await
}
