use std::path::Path;

use tracing::info;

use super::{utc_timestamp, Downloader};
use crate::command::{quote, CommandRunner};
use crate::error::{DownloadError, Result};
use crate::fs_utils::{dir_size, format_size};
use crate::models::DownloadMetadata;

/// Copies a publicly readable blob-storage prefix with AzCopy.
///
/// AzCopy can exit with 0 even when nothing was transferred. Only the exit
/// status is checked here, so such a run is reported as a successful
/// download of whatever ended up on disk.
pub struct AzureBlobDownloader<'a, R> {
    runner: &'a R,
    azcopy: &'a str,
}

impl<'a, R: CommandRunner> AzureBlobDownloader<'a, R> {
    pub fn new(runner: &'a R, azcopy: &'a str) -> Self {
        Self { runner, azcopy }
    }
}

impl<R: CommandRunner> Downloader for AzureBlobDownloader<'_, R> {
    fn download(&self, model_uri: &str, model_dir: &Path) -> Result<DownloadMetadata> {
        info!(uri = model_uri, dir = ?model_dir, "Copying model from blob storage");

        let cmd = format!(
            "{} cp --recursive=true {} {}",
            quote(self.azcopy)?,
            quote(model_uri)?,
            quote(&model_dir.to_string_lossy())?
        );
        let out = self.runner.run(&cmd)?;
        if !out.success() {
            return Err(DownloadError::failed(
                format!("Failed to download model files with URL: {}", model_uri),
                out.output,
            ));
        }

        let download_time_utc = utc_timestamp();
        let size = dir_size(model_dir)?;
        let model_size = format_size(size);
        info!(size_bytes = size, model_size = %model_size, "Blob download complete");

        Ok(DownloadMetadata {
            download_time_utc,
            commit_hash: None,
            model_size,
        })
    }
}
