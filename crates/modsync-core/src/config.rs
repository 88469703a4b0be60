use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/84.0.4147.89 Safari/537.36";

/// Remote catalog endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the addon API used for numeric project IDs.
    pub addon_api: String,
    /// Base URL of the widget API used for project URLs.
    pub widget_api: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            addon_api: "https://addons-ecs.forgesvc.net".to_string(),
            widget_api: "https://api.cfwidget.com".to_string(),
        }
    }
}

/// HTTP client settings shared by catalog lookups and downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    /// Whole-request timeout; covers the full body of a download.
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 30,
            timeout_secs: 600,
        }
    }
}

/// Global configuration loaded from `~/.config/modsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModsyncConfig {
    /// Maximum number of concurrent workers per phase (resolve, delete, fetch).
    pub workers: usize,
    /// Extension of managed files in the target directory (without the dot).
    pub file_extension: String,
    /// Prefix prepended to bare project slugs in URL-format listfiles.
    pub url_prefix: String,
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
}

impl Default for ModsyncConfig {
    fn default() -> Self {
        Self {
            workers: 16,
            file_extension: "jar".to_string(),
            url_prefix: "https://www.curseforge.com/minecraft/mc-mods/".to_string(),
            catalog: CatalogConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("modsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ModsyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ModsyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ModsyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}
