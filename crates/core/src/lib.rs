//! model_fetch_core - Core library for model downloads
//!
//! This crate provides:
//! - Git and blob-storage download strategies
//! - Download metadata (time, size, commit hash)
//! - Local download registry and configuration

pub mod command;
pub mod config;
pub mod downloaders;
pub mod error;
pub mod fs_utils;
pub mod models;
pub mod registry;
pub mod workdir;

pub use config::Config;
pub use downloaders::{download_model, ModelDownloader};
pub use error::{DownloadError, Result};
pub use models::{DownloadMetadata, DownloadRecord, SourceType};
pub use registry::DownloadRegistry;
