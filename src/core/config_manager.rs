// src/core/config_manager.rs
//! Configuration: defaults, then `<data_dir>/config.toml`, then environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "jobs.db";
const LOG_FILE_NAME: &str = "termijob.log";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub storage: StorageConfig,
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// On-disk overrides. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub ollama: OllamaSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct OllamaSection {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl ConfigManager {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `env` as the variable source
    pub fn load_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = resolve_data_dir(&env)?;
        let file = Self::read_config_file(&data_dir.join(CONFIG_FILE_NAME))?;
        Self::merge(data_dir, file, env)
    }

    fn read_config_file(path: &Path) -> Result<ConfigFile> {
        if !path.exists() {
            return Ok(ConfigFile::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        parse_config_file(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn merge<F>(data_dir: PathBuf, file: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = env("TERMIJOB_DATABASE_PATH")
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE_NAME));

        let base_url = env("OLLAMA_HOST")
            .or(file.ollama.base_url)
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let model = env("TERMIJOB_MODEL")
            .or(file.ollama.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_seconds = match env("TERMIJOB_LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("TERMIJOB_LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => file.ollama.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_seconds == 0 {
            anyhow::bail!("LLM timeout must be at least one second");
        }

        Ok(Self {
            storage: StorageConfig {
                log_path: data_dir.join(LOG_FILE_NAME),
                database_path,
                data_dir,
            },
            ollama: OllamaConfig {
                base_url,
                model,
                timeout_seconds,
            },
        })
    }

    /// Ensure the data directory and the database's parent directory exist
    pub async fn ensure_directories(&self) -> Result<()> {
        use crate::core::FsOps;

        FsOps::ensure_dir_exists(&self.storage.data_dir).await?;
        if let Some(db_parent) = self.storage.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }
        Ok(())
    }
}

pub fn parse_config_file(content: &str) -> Result<ConfigFile> {
    toml::from_str(content).context("Invalid config.toml")
}

/// `TERMIJOB_DATA_DIR`, then `$XDG_DATA_HOME/termijob`, then `~/.local/share/termijob`
fn resolve_data_dir<F>(env: &F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = env("TERMIJOB_DATA_DIR").filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = env("XDG_DATA_HOME").filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(xdg).join("termijob"));
    }
    let home = env("HOME").context("HOME is not set; set TERMIJOB_DATA_DIR instead")?;
    Ok(PathBuf::from(home).join(".local").join("share").join("termijob"))
}

/// Ollama accepts `host:port` in `OLLAMA_HOST`; reqwest needs a scheme.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_use_home_data_dir() {
        let config = ConfigManager::merge(
            resolve_data_dir(&env_from(&[("HOME", "/home/ada")])).unwrap(),
            ConfigFile::default(),
            env_from(&[]),
        )
        .unwrap();

        assert_eq!(
            config.storage.database_path,
            PathBuf::from("/home/ada/.local/share/termijob/jobs.db")
        );
        assert_eq!(config.ollama, OllamaConfig::default());
    }

    #[test]
    fn test_xdg_data_home_wins_over_home() {
        let dir = resolve_data_dir(&env_from(&[("HOME", "/home/ada"), ("XDG_DATA_HOME", "/xdg")]))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/xdg/termijob"));
    }

    #[test]
    fn test_missing_home_is_an_error() {
        assert!(resolve_data_dir(&env_from(&[])).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = parse_config_file(
            r#"
            [ollama]
            model = "mistral"
            base_url = "http://gpu-box:11434"
            timeout_seconds = 30
            "#,
        )
        .unwrap();

        let config = ConfigManager::merge(
            PathBuf::from("/data"),
            file,
            env_from(&[("TERMIJOB_MODEL", "llama3.2")]),
        )
        .unwrap();

        assert_eq!(config.ollama.model, "llama3.2");
        assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
        assert_eq!(config.ollama.timeout_seconds, 30);
    }

    #[test]
    fn test_ollama_host_without_scheme() {
        assert_eq!(normalize_base_url("127.0.0.1:11434/"), "http://127.0.0.1:11434");
        assert_eq!(normalize_base_url("https://llm.local"), "https://llm.local");
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let result = ConfigManager::merge(
            PathBuf::from("/data"),
            ConfigFile::default(),
            env_from(&[("TERMIJOB_LLM_TIMEOUT_SECS", "soon")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let from_env = ConfigManager::merge(
            PathBuf::from("/data"),
            ConfigFile::default(),
            env_from(&[("TERMIJOB_LLM_TIMEOUT_SECS", "0")]),
        );
        assert!(from_env.is_err());

        let file = parse_config_file("[ollama]\ntimeout_seconds = 0\n").unwrap();
        assert!(ConfigManager::merge(PathBuf::from("/data"), file, env_from(&[])).is_err());
    }

    #[test]
    fn test_load_with_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "database_path = \"/elsewhere/jobs.db\"\n",
        )
        .unwrap();

        let data_dir = dir.path().to_string_lossy().to_string();
        let config = ConfigManager::load_with(env_from(&[("TERMIJOB_DATA_DIR", data_dir.as_str())])).unwrap();

        assert_eq!(config.storage.database_path, PathBuf::from("/elsewhere/jobs.db"));
        assert_eq!(config.storage.log_path, dir.path().join("termijob.log"));
    }
}
