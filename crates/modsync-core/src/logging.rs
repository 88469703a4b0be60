//! Tracing setup for the `modsync` binary.
//!
//! Events go to `$XDG_STATE_HOME/modsync/modsync.log` (appended across runs,
//! no ANSI colours). When that file can't be opened the caller switches to
//! stderr. `RUST_LOG` overrides the default filter in both cases.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Directory name under the XDG state home.
pub const STATE_PREFIX: &str = "modsync";

pub const LOG_FILE_NAME: &str = "modsync.log";

/// Debug for our own crates, info for everything else (curl, tokio).
const DEFAULT_FILTER: &str = "info,modsync=debug,modsync_core=debug";

/// Filter built from `directives` (normally `RUST_LOG`), or the default when
/// they are absent or don't parse.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn env_filter() -> EnvFilter {
    filter_from(std::env::var("RUST_LOG").ok().as_deref())
}

/// Where the log file lives.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix(STATE_PREFIX)?;
    Ok(dirs.get_state_home().join(LOG_FILE_NAME))
}

/// Opens `path` for appending, creating missing parent directories.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Plain-text subscriber writing every event to `file`.
fn file_subscriber(file: File, filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish()
}

/// Installs the file subscriber as the global default.
///
/// Errors when the state directory or the log file is unusable, so the caller
/// can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = open_log_file(&path).with_context(|| format!("opening {}", path.display()))?;
    tracing::subscriber::set_global_default(file_subscriber(file, env_filter()))
        .context("a global tracing subscriber is already set")?;
    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

/// Installs a stderr subscriber.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}
