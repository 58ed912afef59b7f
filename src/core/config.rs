use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::suggest::{ClientSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

pub const DATA_DIR_ENV: &str = "INTERTASK_DATA_DIR";
pub const CONFIG_FILE: &str = "config.toml";
/// A zero timeout would fail every completion attempt before it starts.
const MIN_TIMEOUT_SECS: u64 = 1;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub suggestions: SuggestionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(skip)]
    pub data_dir: PathBuf,

    /// The file the values came from; `None` when running on defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Relative paths resolve against the data directory.
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_db_path() -> String {
    "intertask.db".to_string()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_api_key_env() -> String {
    "INTERTASK_LLM_API_KEY".to_string()
}
fn default_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl SuggestionConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Look the API key up in the environment. Blank values count as unset.
    pub fn api_key(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        lookup(&self.api_key_env).filter(|k| !k.trim().is_empty())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS)),
            max_retries: self.max_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// `$INTERTASK_DATA_DIR`, else `~/.intertask`, else `./.intertask`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".intertask")
}

impl AppConfig {
    /// Load `config.toml` from `data_dir` and apply environment overrides.
    /// Does not log; see [`AppConfig::log_source`].
    pub async fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let config_path = data_dir.join(CONFIG_FILE);
        let mut config = if config_path.exists() {
            let content = tokio::fs::read_to_string(&config_path)
                .await
                .with_context(|| format!("reading {}", config_path.display()))?;
            let mut parsed: AppConfig = toml::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            parsed.source = Some(config_path);
            parsed
        } else {
            AppConfig::default()
        };
        config.data_dir = data_dir;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => info!("No {} found, using defaults.", CONFIG_FILE),
        }
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("INTERTASK_API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("INTERTASK_API_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("INTERTASK_LLM_BASE_URL") {
            self.suggestions.base_url = url;
        }
        if let Some(model) = lookup("INTERTASK_LLM_MODEL") {
            self.suggestions.model = model;
        }
    }

    pub fn database_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.database.path);
        if path.is_absolute() {
            path
        } else {
            self.data_dir.join(path)
        }
    }
}
