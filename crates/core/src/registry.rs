use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::DownloadRecord;

/// Downloads pulled through the CLI, persisted as JSON.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DownloadRegistry {
    models: BTreeMap<String, DownloadRecord>,
    #[serde(skip)]
    registry_path: PathBuf,
}

impl DownloadRegistry {
    pub fn load() -> Result<Self> {
        let base_dir = Config::base_dir()?;
        fs::create_dir_all(&base_dir)?;
        Self::load_from(&Config::registry_path()?)
    }

    pub fn load_from(registry_path: &Path) -> Result<Self> {
        let mut registry = if registry_path.exists() {
            let content = fs::read_to_string(registry_path)?;
            serde_json::from_str(&content)?
        } else {
            DownloadRegistry::default()
        };

        registry.registry_path = registry_path.to_path_buf();
        Ok(registry)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self)?;
        fs::write(&self.registry_path, content)?;
        Ok(())
    }

    pub fn add(&mut self, record: DownloadRecord) -> Result<()> {
        self.models.insert(record.name.clone(), record);
        self.save()?;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Option<DownloadRecord>> {
        let removed = self.models.remove(name);
        self.save()?;
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Option<&DownloadRecord> {
        self.models.get(name)
    }

    pub fn list(&self) -> Vec<&DownloadRecord> {
        self.models.values().collect()
    }

    /// Names containing `needle`, for "did you mean" hints.
    pub fn similar(&self, needle: &str) -> Vec<&str> {
        self.models
            .keys()
            .filter(|name| name.contains(needle))
            .map(String::as_str)
            .collect()
    }
}
