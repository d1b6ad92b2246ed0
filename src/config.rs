use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_FILE_NAME: &str = "config.json";
const STORAGE_FILE_NAME: &str = "local_storage.json";

pub const DEFAULT_API_BASE_URL: &str = "https://curieus.net";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_EXTRACTION_MODEL: &str = "gpt-4o";
pub const DEFAULT_INSIGHTS_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub default_team: Option<String>,
    pub openai_base_url: String,
    pub extraction_model: String,
    pub insights_model: String,
    pub storage_path: PathBuf,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        let storage_path = config_directory()?.join(STORAGE_FILE_NAME);
        Ok(Self::resolve(stored, |name| env::var(name).ok(), storage_path))
    }

    /// Environment overrides win over the stored file, which wins over defaults.
    fn resolve(
        stored: StoredConfig,
        lookup: impl Fn(&str) -> Option<String>,
        storage_path: PathBuf,
    ) -> Self {
        let env_value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            api_base_url: env_value("WORKLOG_API_URL")
                .or(stored.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_token: env_value("WORKLOG_API_TOKEN").or(stored.api_token),
            default_team: env_value("WORKLOG_TEAM").or(stored.default_team),
            openai_base_url: stored
                .openai_base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            extraction_model: env_value("WORKLOG_OPENAI_MODEL")
                .or(stored.openai_model)
                .unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string()),
            insights_model: DEFAULT_INSIGHTS_MODEL.to_string(),
            storage_path,
        }
    }

    pub fn team_or(&self, team: Option<String>) -> AppResult<String> {
        team.or_else(|| self.default_team.clone())
            .filter(|team| !team.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration(
                    "no team given; pass --team or set a default with `worklog config init`"
                        .to_string(),
                )
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Some(dir) = env::var_os("WORKLOG_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(dir).join("worklog"));
    }
    env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config").join("worklog"))
        .ok_or_else(|| {
            AppError::Configuration(
                "cannot locate a config directory; set WORKLOG_CONFIG_DIR".to_string(),
            )
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
