use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::domain::AssemblyFile;
use crate::error::AssemblyError;
use crate::ncbi::DEFAULT_BASE_URL;

pub const PROJECT_CONFIG_FILE: &str = "kira-af.json";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub include: Option<Vec<AssemblyFile>>,
}

/// Effective run settings after config file and CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub schema_version: u32,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub include: Vec<AssemblyFile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            include: AssemblyFile::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub include: Option<Vec<AssemblyFile>>,
}

impl Settings {
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Result<Self, AssemblyError> {
        if let Some(base_url) = overrides.base_url {
            self.base_url = validate_base_url(base_url)?;
        }
        if let Some(include) = overrides.include {
            self.include = validate_include(include)?;
        }
        Ok(self)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Explicit `path` must exist. Otherwise `./kira-af.json`, then the user
    /// config dir, then built-in defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Settings, AssemblyError> {
        let config_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };
        let Some(config_path) = config_path else {
            return Ok(Settings::default());
        };
        tracing::debug!(path = %config_path.display(), "Loading config");
        Self::load(&config_path)
    }

    pub fn load(path: &Path) -> Result<Settings, AssemblyError> {
        let content =
            fs::read_to_string(path).map_err(|_| AssemblyError::ConfigRead(path.to_path_buf()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| AssemblyError::ConfigParse(err.to_string()))?;
        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<Settings, AssemblyError> {
        let defaults = Settings::default();
        let base_url = match config.base_url {
            Some(url) => validate_base_url(url)?,
            None => defaults.base_url,
        };
        let include = match config.include {
            Some(include) => validate_include(include)?,
            None => defaults.include,
        };
        Ok(Settings {
            schema_version: config.schema_version.unwrap_or(defaults.schema_version),
            base_url,
            timeout: config.timeout_secs.map(Duration::from_secs),
            include,
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(PROJECT_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        user_config_path().filter(|path| path.exists())
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| {
        dirs.config_dir()
            .join("kira-assembly-fetch")
            .join("config.json")
    })
}

fn validate_base_url(url: String) -> Result<String, AssemblyError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AssemblyError::InvalidConfig(format!(
            "base_url must be an http(s) URL: {url}"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_include(include: Vec<AssemblyFile>) -> Result<Vec<AssemblyFile>, AssemblyError> {
    if include.is_empty() {
        return Err(AssemblyError::InvalidConfig(
            "include must name at least one file".to_string(),
        ));
    }
    // Keep archive order and drop repeats.
    Ok(AssemblyFile::ALL
        .into_iter()
        .filter(|file| include.contains(file))
        .collect())
}
