//! CLI for modsync.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use modsync_core::config::{self, ModsyncConfig};
use modsync_core::listfile::ListFormat;
use modsync_core::sync::{self, SyncOptions};
use std::path::PathBuf;

use commands::{run_check, run_plan, run_sync, SyncFlags};

/// Top-level CLI for modsync.
#[derive(Debug, Parser)]
#[command(name = "modsync")]
#[command(about = "modsync: keep a mods directory in sync with a listfile", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Listfile entry format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Numeric project IDs, optionally followed by a file ID or release type.
    Ids,
    /// Project URLs or slugs.
    Urls,
}

/// Where the mods directory and listfile are.
#[derive(Debug, Clone, Args)]
pub struct ListfileArgs {
    /// The mods directory.
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub dir: PathBuf,

    /// The listfile location; a leading %dir/ makes it relative to the mods directory.
    #[arg(long, default_value = sync::DEFAULT_LISTFILE, value_name = "FILE")]
    pub modsfile: String,

    /// How entry lines are written.
    #[arg(long, value_enum, default_value_t = FormatArg::Ids)]
    pub format: FormatArg,
}

impl ListfileArgs {
    pub fn listfile_path(&self) -> PathBuf {
        sync::resolve_listfile_path(&self.dir, &self.modsfile)
    }

    pub fn list_format(&self, cfg: &ModsyncConfig) -> ListFormat {
        match self.format {
            FormatArg::Ids => ListFormat::Ids,
            FormatArg::Urls => ListFormat::Urls {
                prefix: cfg.url_prefix.clone(),
            },
        }
    }
}

/// Flags shared by commands that resolve against the catalog.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub listfile: ListfileArgs,

    /// Concurrent workers per phase (default from config).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

impl RunArgs {
    pub fn options(&self, cfg: &ModsyncConfig, dry_run: bool) -> SyncOptions {
        SyncOptions {
            dir: self.listfile.dir.clone(),
            listfile: self.listfile.listfile_path(),
            format: self.listfile.list_format(cfg),
            extension: cfg.file_extension.clone(),
            workers: self.workers.unwrap_or(cfg.workers).max(1),
            dry_run,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Delete unwanted files and fetch missing ones.
    Sync {
        #[command(flatten)]
        run: RunArgs,

        /// Open download links in the browser instead of downloading.
        #[arg(long)]
        browser: bool,

        /// List mods that are already up to date.
        #[arg(long)]
        u2d: bool,

        /// Hide mods which are kept back from upgrading.
        #[arg(long)]
        hidekb: bool,
    },

    /// Show what a sync would delete and fetch, without changing anything.
    Plan {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Parse the listfile and print a summary.
    Check {
        #[command(flatten)]
        listfile: ListfileArgs,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync {
                run,
                browser,
                u2d,
                hidekb,
            } => {
                let flags = SyncFlags {
                    browser,
                    show_up_to_date: u2d,
                    hide_kept_back: hidekb,
                };
                run_sync(&cfg, &run.options(&cfg, false), flags).await?
            }
            CliCommand::Plan { run } => run_plan(&cfg, &run.options(&cfg, true)).await?,
            CliCommand::Check { listfile } => {
                run_check(&listfile.listfile_path(), &listfile.list_format(&cfg))?
            }
        }

        Ok(())
    }
}
