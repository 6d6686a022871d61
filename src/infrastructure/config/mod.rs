use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::sheets::SheetsConfig;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "deepflow.db".to_string(),
        }
    }
}

/// Overrides for the generators' built-in system prompts.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    pub workflow: Option<String>,
    pub dashboard: Option<String>,
    pub mockup: Option<String>,
    pub proposal: Option<String>,
    pub build_guide: Option<String>,
}

/// Service settings, merged from `deepflow.toml` and `DEEPFLOW_*` env vars
/// (env wins, `__` separates nesting, e.g. `DEEPFLOW_GATEWAY__API_KEY`).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub gateway: LLMConfig,
    pub sheets: Option<SheetsConfig>,
    pub prompts: PromptSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Figment::new()
            .merge(Toml::file("deepflow.toml"))
            .merge(Env::prefixed("DEEPFLOW_").split("__"))
            .extract()
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {}", e)))
    }
}
