use std::path::Path;

use tracing::{debug, info};

use super::{utc_timestamp, Downloader};
use crate::command::{quote, CommandRunner};
use crate::error::{DownloadError, Result};
use crate::fs_utils::{dir_size, format_size, remove_dir_tree};
use crate::models::DownloadMetadata;
use crate::workdir::WorkingDirGuard;

const GIT_METADATA_DIR: &str = ".git";

/// Shallow-clones a public repository and strips its history.
pub struct GitDownloader<'a, R> {
    runner: &'a R,
    git: &'a str,
}

impl<'a, R: CommandRunner> GitDownloader<'a, R> {
    pub fn new(runner: &'a R, git: &'a str) -> Self {
        Self { runner, git }
    }

    fn clone_repo(&self, model_uri: &str, model_dir: &Path) -> Result<()> {
        let cmd = format!(
            "{} clone --depth=1 {} {}",
            quote(self.git)?,
            quote(model_uri)?,
            quote(&model_dir.to_string_lossy())?
        );
        let out = self.runner.run(&cmd)?;
        if !out.success() {
            return Err(DownloadError::failed(
                format!("Could not clone repo {}", model_uri),
                out.output,
            ));
        }
        Ok(())
    }

    /// Hash of HEAD exactly as git prints it.
    ///
    /// Some shells pass the quotes around the format string through to git,
    /// so the result can come back as `'<hash>'`. That form is kept.
    fn head_commit(&self, model_dir: &Path) -> Result<String> {
        let _cwd = WorkingDirGuard::enter(model_dir)?;
        let cmd = format!("{} log --oneline -n 1 --pretty=tformat:'%H'", quote(self.git)?);
        let out = self.runner.run(&cmd)?;
        if !out.success() {
            return Err(DownloadError::failed(
                "Could not capture commit HEAD",
                out.output,
            ));
        }
        Ok(out.output)
    }
}

impl<R: CommandRunner> Downloader for GitDownloader<'_, R> {
    fn download(&self, model_uri: &str, model_dir: &Path) -> Result<DownloadMetadata> {
        info!(uri = model_uri, dir = ?model_dir, "Cloning model repository");
        self.clone_repo(model_uri, model_dir)?;

        let download_time_utc = utc_timestamp();
        let commit_hash = self.head_commit(model_dir)?;
        debug!(commit = %commit_hash, "Captured HEAD commit");

        remove_dir_tree(&model_dir.join(GIT_METADATA_DIR))?;

        let size = dir_size(model_dir)?;
        let model_size = format_size(size);
        info!(size_bytes = size, model_size = %model_size, "Git download complete");

        Ok(DownloadMetadata {
            download_time_utc,
            commit_hash: Some(commit_hash),
            model_size,
        })
    }
}
