use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_AMAP_BASE_URL: &str = "https://restapi.amap.com/v3/weather";
pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.siliconflow.cn/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-ai/DeepSeek-R1-0528-Qwen3-8B";

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmapConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_AMAP_BASE_URL.to_string(),
        }
    }
}

/// Where the advice text lives inside the model provider's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseEnvelope {
    /// `choices[0].message.content`, as returned by OpenAI-compatible APIs.
    #[default]
    ChatCompletions,
    /// The response body is the advice object itself.
    Flat,
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub envelope: ResponseEnvelope,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            envelope: ResponseEnvelope::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Overrides the platform cache directory.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [amap]
/// api_key = "..."
///
/// [llm]
/// api_key = "..."
/// model = "deepseek-ai/DeepSeek-R1-0528-Qwen3-8B"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub amap: AmapConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk only, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding cached weather snapshots.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.cache_dir().to_path_buf()),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-advisor", "weather-advisor")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Override keys and LLM settings from the environment.
    /// `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("AMAP_KEY") {
            self.amap.api_key = Some(key);
        }
        if let Some(key) = non_empty("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = non_empty("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(endpoint) = non_empty("LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
    }

    pub fn amap_api_key(&self) -> Option<&str> {
        self.amap.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm.api_key.as_deref().filter(|k| !k.is_empty())
    }
}
