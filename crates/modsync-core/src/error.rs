//! Top-level error for a sync run.

use std::path::PathBuf;
use tokio::task::JoinError;

use crate::fetch::FetchError;
use crate::listfile::ParseError;
use crate::resolve::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("couldn't list {}", dir.display())]
    Listing {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't delete {file}")]
    DeletionFailed {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't fetch {file}")]
    FetchFailed {
        file: String,
        #[source]
        source: FetchError,
    },

    #[error("sync worker failed")]
    Join(#[from] JoinError),
}
