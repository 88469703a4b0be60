//! HTTP-backed catalog: addon API for IDs, widget API for project URLs.

use serde::de::DeserializeOwned;
use url::Url;

use super::wire::{AddonFileV2, AddonRecordV2, WidgetProjectV1};
use super::{CatalogError, CatalogRecord, CatalogService, KnownFile, WidgetRecord};
use crate::config::ModsyncConfig;
use crate::http::HttpClient;
use crate::listfile::VersionConstraint;

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: HttpClient,
    addon_api: String,
    widget_api: String,
}

impl HttpCatalog {
    pub fn new(http: HttpClient, addon_api: &str, widget_api: &str) -> Self {
        Self {
            http,
            addon_api: addon_api.trim_end_matches('/').to_string(),
            widget_api: widget_api.to_string(),
        }
    }

    pub fn from_config(cfg: &ModsyncConfig) -> Self {
        Self::new(
            HttpClient::new(&cfg.http),
            &cfg.catalog.addon_api,
            &cfg.catalog.widget_api,
        )
    }

    /// Widget lookup URL: the project's path appended to the widget base, plus `?version=`.
    pub fn widget_url(&self, project_url: &str, version: &VersionConstraint) -> Result<Url, CatalogError> {
        let project = Url::parse(project_url).map_err(|source| CatalogError::InvalidUrl {
            url: project_url.to_string(),
            source,
        })?;
        let mut api = Url::parse(&self.widget_api).map_err(|source| CatalogError::InvalidUrl {
            url: self.widget_api.clone(),
            source,
        })?;
        let path = format!("{}{}", api.path().trim_end_matches('/'), project.path());
        api.set_path(&path);
        api.query_pairs_mut()
            .clear()
            .append_pair("version", version.as_str());
        Ok(api)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, CatalogError> {
    serde_json::from_slice(body).map_err(|source| CatalogError::Json {
        url: url.to_string(),
        source,
    })
}

impl CatalogService for HttpCatalog {
    fn lookup_many(&self, ids: &[u64]) -> Result<Vec<CatalogRecord>, CatalogError> {
        let url = format!("{}/api/v2/addon", self.addon_api);
        let body = serde_json::to_vec(ids).map_err(|source| CatalogError::Json {
            url: url.clone(),
            source,
        })?;
        tracing::debug!(count = ids.len(), "batch lookup {}", url);
        let response = self.http.post_json(&url, &body)?;
        let records: Vec<AddonRecordV2> = decode(&url, &response)?;
        records.into_iter().map(CatalogRecord::try_from).collect()
    }

    fn list_files(&self, id: u64) -> Result<Vec<KnownFile>, CatalogError> {
        let url = format!("{}/api/v2/addon/{}/files", self.addon_api, id);
        tracing::debug!("file list lookup {}", url);
        let response = self.http.get(&url)?;
        let files: Vec<AddonFileV2> = decode(&url, &response)?;
        files.into_iter().map(KnownFile::try_from).collect()
    }

    fn lookup_url(
        &self,
        url: &str,
        version: &VersionConstraint,
    ) -> Result<WidgetRecord, CatalogError> {
        let api = self.widget_url(url, version)?;
        tracing::debug!("widget lookup {}", api);
        let response = self.http.get(api.as_str())?;
        let project: WidgetProjectV1 = decode(api.as_str(), &response)?;
        WidgetRecord::try_from(project)
    }
}
