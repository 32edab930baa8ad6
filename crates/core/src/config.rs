use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// External tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Git executable used for clones
    #[serde(default = "default_git")]
    pub git: String,

    /// AzCopy executable used for blob copies
    #[serde(default = "default_azcopy")]
    pub azcopy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Parent directory for pulled models (default: ~/.config/model-fetch/models/)
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
}

fn default_git() -> String {
    "git".to_string()
}

fn default_azcopy() -> String {
    "azcopy".to_string()
}

fn default_models_dir() -> PathBuf {
    Config::base_dir()
        .map(|p| p.join("models"))
        .unwrap_or_else(|_| PathBuf::from("~/.config/model-fetch/models"))
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: default_git(),
            azcopy: default_azcopy(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
        }
    }
}

impl Config {
    /// Get the base directory: ~/.config/model-fetch/
    pub fn base_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("USERPROFILE").map(PathBuf::from))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(home.join(".config").join("model-fetch"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from a file, falling back to defaults when it is missing
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the config file path: ~/.config/model-fetch/config.toml
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.toml"))
    }

    /// Get the registry file path: ~/.config/model-fetch/registry.json
    pub fn registry_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("registry.json"))
    }

    /// Get the models directory from config
    pub fn models_dir(&self) -> PathBuf {
        self.storage.models_dir.clone()
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "tools.git" => Ok(self.tools.git.clone()),
            "tools.azcopy" => Ok(self.tools.azcopy.clone()),
            "storage.models_dir" => Ok(self.storage.models_dir.display().to_string()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "tools.git" => self.tools.git = non_empty(key, value)?,
            "tools.azcopy" => self.tools.azcopy = non_empty(key, value)?,
            "storage.models_dir" => {
                self.storage.models_dir = if value.is_empty() {
                    default_models_dir()
                } else {
                    PathBuf::from(value)
                }
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", key);
    }
    Ok(value.to_string())
}
