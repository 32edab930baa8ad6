pub mod azure_blob;
pub mod git;

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::command::{CommandRunner, ShellRunner};
use crate::config::{Config, ToolsConfig};
use crate::error::{DownloadError, Result};
use crate::models::{DownloadMetadata, SourceType};

pub use azure_blob::AzureBlobDownloader;
pub use git::GitDownloader;

/// One way of getting model files into a local directory.
pub trait Downloader {
    fn download(&self, model_uri: &str, model_dir: &Path) -> Result<DownloadMetadata>;
}

/// Picks the strategy for a source type and runs it.
pub struct ModelDownloader<R = ShellRunner> {
    runner: R,
    tools: ToolsConfig,
}

impl ModelDownloader<ShellRunner> {
    pub fn new() -> Self {
        Self::with_runner(ShellRunner, ToolsConfig::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_runner(ShellRunner, config.tools.clone())
    }
}

impl Default for ModelDownloader<ShellRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> ModelDownloader<R> {
    pub fn with_runner(runner: R, tools: ToolsConfig) -> Self {
        Self { runner, tools }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Download `model_uri` into `model_dir` and describe the result.
    ///
    /// Unsupported source types fail before anything touches the disk or
    /// spawns a process.
    pub fn download(
        &self,
        source_type: SourceType,
        model_uri: &str,
        model_dir: &Path,
    ) -> Result<DownloadMetadata> {
        log_execution_time("download_model", || match source_type {
            SourceType::Git => {
                GitDownloader::new(&self.runner, &self.tools.git).download(model_uri, model_dir)
            }
            SourceType::AzureBlob => AzureBlobDownloader::new(&self.runner, &self.tools.azcopy)
                .download(model_uri, model_dir),
            SourceType::Local => Err(DownloadError::UnsupportedSource(
                source_type.to_string(),
            )),
        })
    }
}

/// Download with the default shell runner and tool names.
pub fn download_model(
    model_path_type: SourceType,
    model_uri: &str,
    model_dir: &Path,
) -> Result<DownloadMetadata> {
    ModelDownloader::new().download(model_path_type, model_uri, model_dir)
}

fn log_execution_time<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(
        function = name,
        elapsed_ms,
        success = result.is_ok(),
        "Execution finished"
    );
    result
}

/// Current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn utc_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
