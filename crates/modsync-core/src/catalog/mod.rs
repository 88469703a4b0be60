//! Remote catalog: domain records and the service interface.
//!
//! The resolver only depends on [`CatalogService`]; [`HttpCatalog`] is the
//! production implementation talking to the addon and widget APIs.

#[cfg(test)]
pub(crate) mod fake;
mod service;
pub mod wire;

use time::OffsetDateTime;

use crate::channel::Channel;
use crate::http::HttpError;
use crate::listfile::VersionConstraint;

pub use service::HttpCatalog;

/// Character that replaces spaces in remote file names.
pub const SPACE_SUBSTITUTE: char = '+';

/// Filesystem- and URL-safe name under which a remote file is stored locally.
pub fn canonical_name(file_name: &str) -> String {
    file_name.replace(' ', &SPACE_SUBSTITUTE.to_string())
}

/// A downloadable file known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownFile {
    pub id: u64,
    pub display_name: String,
    pub file_name: String,
    pub uploaded_at: OffsetDateTime,
    pub channel: Channel,
    /// Game versions the file declares support for.
    pub game_versions: Vec<String>,
    pub download_url: String,
}

impl KnownFile {
    pub fn canonical_name(&self) -> String {
        canonical_name(&self.file_name)
    }
}

/// A project as returned by the batch lookup, with its most recent files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub id: u64,
    pub name: String,
    pub files: Vec<KnownFile>,
}

/// A project resolved by URL. `file` is the newest file for the requested version, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRecord {
    pub id: u64,
    pub title: String,
    pub file: Option<KnownFile>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("invalid JSON exchanged with {url}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected catalog data: {0}")]
    Schema(String),

    #[error("invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Remote catalog operations. Implementations block; call from `spawn_blocking`.
pub trait CatalogService: Send + Sync {
    /// Looks up many projects by ID in one round trip.
    fn lookup_many(&self, ids: &[u64]) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Full file list of one project, for when its latest files don't satisfy an entry.
    fn list_files(&self, id: u64) -> Result<Vec<KnownFile>, CatalogError>;

    /// Looks up one project by its page URL, filtered to `version`.
    fn lookup_url(
        &self,
        url: &str,
        version: &VersionConstraint,
    ) -> Result<WidgetRecord, CatalogError>;
}
