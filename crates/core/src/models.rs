use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DownloadError;

/// Where model artifacts live before they are pulled.
///
/// `Local` is understood by the wider pipeline (files already on disk) but
/// there is nothing to download for it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Git,
    AzureBlob,
    Local,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Git => "git",
            SourceType::AzureBlob => "azureblob",
            SourceType::Local => "local",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(SourceType::Git),
            "azureblob" | "azure_blob" | "azure-blob" => Ok(SourceType::AzureBlob),
            "local" => Ok(SourceType::Local),
            other => Err(DownloadError::UnsupportedSource(other.to_string())),
        }
    }
}

/// What a download reports back to the caller.
///
/// Serializes to a flat mapping; `commit_hash` is only present for git
/// sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadMetadata {
    pub download_time_utc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
    pub model_size: String,
}

/// A pulled model as kept in the local registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub name: String,
    pub source: SourceType,
    pub uri: String,
    pub path: PathBuf,
    pub metadata: DownloadMetadata,
}

impl DownloadRecord {
    /// Derive a model name from the last path segment of a URI.
    ///
    /// `https://host/org/repo.git` becomes `repo`. Trailing slashes, query
    /// strings and wildcard segments (`models/bert/*`) are ignored.
    pub fn name_from_uri(uri: &str) -> Option<String> {
        let mut rest = uri
            .split(['?', '#'])
            .next()
            .unwrap_or(uri)
            .trim_end_matches('/');

        loop {
            let (head, segment) = rest.rsplit_once(['/', ':']).unwrap_or(("", rest));
            if segment.contains('*') {
                rest = head.trim_end_matches('/');
                continue;
            }

            let name = segment.strip_suffix(".git").unwrap_or(segment);
            return if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            };
        }
    }
}
