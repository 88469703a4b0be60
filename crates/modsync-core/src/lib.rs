//! Core of `modsync`: keep a directory of mod files in sync with a listfile.
//!
//! Pipeline: [`listfile`] → [`resolve`] (via a [`catalog::CatalogService`]) →
//! [`plan`] → [`fetch`], driven by [`sync::run_sync`].

pub mod catalog;
pub mod channel;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod listfile;
pub mod logging;
pub mod plan;
mod pool;
pub mod progress;
pub mod resolve;
pub mod sync;

pub use error::SyncError;
