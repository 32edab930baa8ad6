use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DownloadError>;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// The source type is not one this downloader knows how to fetch.
    #[error("Unsupported model download method: {0}")]
    UnsupportedSource(String),

    /// An external tool ran but reported failure.
    #[error("{message}. Error => {output}")]
    DownloadFailed { message: String, output: String },

    /// The shell could not be started at all.
    #[error("Failed to launch `{command}`: {source}")]
    CommandLaunch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// A URI or path that cannot be put on a shell command line.
    #[error("Cannot pass {arg:?} to the shell: {reason}")]
    InvalidArgument { arg: String, reason: String },

    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DownloadError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn failed(message: impl Into<String>, output: impl Into<String>) -> Self {
        DownloadError::DownloadFailed {
            message: message.into(),
            output: output.into(),
        }
    }
}
