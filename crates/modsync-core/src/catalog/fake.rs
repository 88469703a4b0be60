//! In-memory catalog for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use time::OffsetDateTime;

use super::{CatalogError, CatalogRecord, CatalogService, KnownFile, WidgetRecord};
use crate::channel::Channel;
use crate::listfile::VersionConstraint;

pub(crate) fn known_file(
    id: u64,
    file_name: &str,
    versions: &[&str],
    uploaded_at: OffsetDateTime,
    channel: Channel,
) -> KnownFile {
    KnownFile {
        id,
        display_name: file_name.to_string(),
        file_name: file_name.to_string(),
        uploaded_at,
        channel,
        game_versions: versions.iter().map(|v| v.to_string()).collect(),
        download_url: format!("https://cdn.example/files/{id}/{file_name}"),
    }
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub records: Vec<CatalogRecord>,
    pub full_lists: HashMap<u64, Vec<KnownFile>>,
    pub widgets: HashMap<String, WidgetRecord>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_records(records: Vec<CatalogRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CatalogService for FakeCatalog {
    fn lookup_many(&self, ids: &[u64]) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.record_call(format!("lookup_many {:?}", ids));
        Ok(self
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    fn list_files(&self, id: u64) -> Result<Vec<KnownFile>, CatalogError> {
        self.record_call(format!("list_files {}", id));
        self.full_lists
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::Schema(format!("no file list for {id}")))
    }

    fn lookup_url(
        &self,
        url: &str,
        _version: &VersionConstraint,
    ) -> Result<WidgetRecord, CatalogError> {
        self.record_call(format!("lookup_url {}", url));
        self.widgets
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::Schema(format!("unknown project {url}")))
    }
}
