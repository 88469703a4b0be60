//! Wire schema of the remote catalog services, decoded at the boundary.
//!
//! Field names here follow the services' JSON. Nothing outside this module
//! sees them; records are converted into [`CatalogRecord`], [`KnownFile`] and
//! [`WidgetRecord`] right after decoding.

use serde::Deserialize;
use time::OffsetDateTime;

use super::{CatalogError, CatalogRecord, KnownFile, WidgetRecord};
use crate::channel::Channel;

/// Addon API (v2) project record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonRecordV2 {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub latest_files: Vec<AddonFileV2>,
}

/// Addon API (v2) file record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonFileV2 {
    pub id: u64,
    pub display_name: String,
    pub file_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub file_date: OffsetDateTime,
    pub release_type: u8,
    pub download_url: String,
    #[serde(default)]
    pub game_version: Vec<String>,
}

/// Widget API project record.
#[derive(Debug, Deserialize)]
pub struct WidgetProjectV1 {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub download: Option<WidgetFileV1>,
}

/// Widget API file record. `url` points at the file's page, not the binary.
#[derive(Debug, Deserialize)]
pub struct WidgetFileV1 {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    #[serde(rename = "type")]
    pub release_type: String,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

impl TryFrom<AddonFileV2> for KnownFile {
    type Error = CatalogError;

    fn try_from(file: AddonFileV2) -> Result<Self, Self::Error> {
        let channel = Channel::from_rank(file.release_type).ok_or_else(|| {
            CatalogError::Schema(format!(
                "file {} has unknown release type {}",
                file.id, file.release_type
            ))
        })?;
        Ok(KnownFile {
            id: file.id,
            display_name: file.display_name,
            file_name: file.file_name,
            uploaded_at: file.file_date,
            channel,
            game_versions: file.game_version,
            download_url: file.download_url,
        })
    }
}

impl TryFrom<AddonRecordV2> for CatalogRecord {
    type Error = CatalogError;

    fn try_from(record: AddonRecordV2) -> Result<Self, Self::Error> {
        let files = record
            .latest_files
            .into_iter()
            .map(KnownFile::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CatalogRecord {
            id: record.id,
            name: record.name,
            files,
        })
    }
}

impl TryFrom<WidgetFileV1> for KnownFile {
    type Error = CatalogError;

    fn try_from(file: WidgetFileV1) -> Result<Self, Self::Error> {
        let channel = Channel::from_name(&file.release_type).ok_or_else(|| {
            CatalogError::Schema(format!(
                "file {} has unknown release type \"{}\"",
                file.id, file.release_type
            ))
        })?;
        Ok(KnownFile {
            id: file.id,
            display_name: file.display,
            file_name: file.name,
            uploaded_at: file.uploaded_at,
            channel,
            game_versions: file.versions,
            download_url: file.url,
        })
    }
}

impl TryFrom<WidgetProjectV1> for WidgetRecord {
    type Error = CatalogError;

    fn try_from(project: WidgetProjectV1) -> Result<Self, Self::Error> {
        Ok(WidgetRecord {
            id: project.id,
            title: project.title,
            file: project.download.map(KnownFile::try_from).transpose()?,
        })
    }
}
