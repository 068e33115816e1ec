/*
[INPUT]:  YAML configuration file + FASIH_CONSOLE__* environment overrides
[OUTPUT]: Parsed console configuration and the backend client built from it
[POS]:    Configuration layer - console setup
[UPDATE]: When adding new configuration options
[UPDATE]: 2026-10-17 Layer environment overrides over the YAML file
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat, Map};
use fasih_sm_adapter::{ClientConfig, DEFAULT_BASE_URL, FasihClient};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "FASIH_CONSOLE";

/// Top-level configuration for the operator console
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    /// Where downloaded artifacts are written
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default)]
    pub log: LogConfig,
}

/// Automation backend connection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Delay between task progress reads
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Daily rolling log files go here in interactive mode
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            polling: PollingConfig::default(),
            download_dir: default_download_dir(),
            log: LogConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fasih-sm")
}

impl ConsoleConfig {
    /// `~/.config/fasih-sm-console/config.yaml` (or the platform equivalent)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fasih-sm-console")
            .join("config.yaml")
    }

    /// Load from `path` (optional file when `required` is false) plus process environment
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        Self::load_with_env(path, required, None)
    }

    fn load_with_env(
        path: &Path,
        required: bool,
        env: Option<Map<String, String>>,
    ) -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Yaml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = settings.try_deserialize().context("parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.polling.interval_ms == 0 {
            bail!("polling.interval_ms must be greater than zero");
        }
        if self.backend.timeout_secs == 0 {
            bail!("backend.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.backend.timeout_secs),
            connect_timeout: Duration::from_secs(self.backend.connect_timeout_secs),
        }
    }

    pub fn build_client(&self) -> Result<FasihClient> {
        FasihClient::with_config_and_base_url(self.client_config(), &self.backend.base_url)
            .with_context(|| format!("build backend client for {}", self.backend.base_url))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("failed to serialize config to YAML")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, yaml)
            .with_context(|| format!("failed to write config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ConsoleConfig::load_with_env(
            &dir.path().join("absent.yaml"),
            false,
            Some(Map::new()),
        )
        .expect("load");
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result =
            ConsoleConfig::load_with_env(&dir.path().join("absent.yaml"), true, Some(Map::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_yaml_then_env_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "backend:\n  base_url: http://10.0.0.5:5005/api\npolling:\n  interval_ms: 500\ndownload_dir: /srv/fasih\n",
        )
        .expect("write");

        let env: Map<String, String> = [
            ("FASIH_CONSOLE__BACKEND__TIMEOUT_SECS", "90"),
            ("FASIH_CONSOLE__LOG__LEVEL", "debug"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
        let config = ConsoleConfig::load_with_env(&path, true, Some(env)).expect("load");

        assert_eq!(config.backend.base_url, "http://10.0.0.5:5005/api");
        assert_eq!(config.backend.timeout_secs, 90);
        assert_eq!(config.backend.connect_timeout_secs, 10);
        assert_eq!(config.polling.interval_ms, 500);
        assert_eq!(config.download_dir, PathBuf::from("/srv/fasih"));
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "polling:\n  interval_ms: 0\n").expect("write");
        assert!(ConsoleConfig::load_with_env(&path, true, Some(Map::new())).is_err());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = ConsoleConfig::default();
        config.log.directory = Some(dir.path().join("logs"));
        config.write_to(&path).expect("write");

        let loaded = ConsoleConfig::load_with_env(&path, true, Some(Map::new())).expect("load");
        assert_eq!(loaded, config);
    }
}
