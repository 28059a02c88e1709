// Configuration Storage Service
// Handles config file read/write, env overrides and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_CONFIG_DIR: &str = "CANDIDATE_LENS_CONFIG_DIR";
pub const ENV_HOST: &str = "CANDIDATE_LENS_HOST";
pub const ENV_PORT: &str = "CANDIDATE_LENS_PORT";
pub const ENV_UPLOAD_DIR: &str = "CANDIDATE_LENS_UPLOAD_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            templates_dir: default_templates_dir(),
            static_dir: default_static_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default = "default_true")]
    pub autopilot_enabled: bool,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            autopilot_enabled: true,
            sensitivity: default_sensitivity(),
        }
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_templates_dir() -> PathBuf { PathBuf::from("templates") }
fn default_static_dir() -> PathBuf { PathBuf::from("static") }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }
fn default_true() -> bool { true }
fn default_sensitivity() -> String { "medium".to_string() }

impl AppConfig {
    /// Apply `CANDIDATE_LENS_*` overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(dir) = lookup(ENV_UPLOAD_DIR).filter(|d| !d.trim().is_empty()) {
            self.storage.upload_dir = PathBuf::from(dir.trim());
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        match std::env::var(ENV_CONFIG_DIR) {
            Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p)),
            _ => dirs::config_dir().map(|p| p.join("candidateLens")),
        }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration, writing the defaults on first run
    pub fn load_or_init(&self) -> Result<AppConfig, ConfigError> {
        if self.config_file.exists() {
            return self.load();
        }
        let config = AppConfig::default();
        self.save(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content =
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));
        fs::copy(&self.config_file, &backup_file)?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // File names embed the timestamp, so name order is age order.
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
        assert!(config.analysis.autopilot_enabled);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"server":{"port":9100}}"#).unwrap();
        assert_eq!(parsed.server.port, 9100);
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.analysis.sensitivity, "medium");
    }

    #[test]
    fn test_load_missing_returns_default_and_init_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("cfg"));
        assert_eq!(store.load().unwrap().server.port, 8000);
        assert!(!store.config_file().exists());

        store.load_or_init().unwrap();
        assert!(store.config_file().exists());
    }

    #[test]
    fn test_save_roundtrip_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        let mut config = AppConfig::default();
        store.save(&config).unwrap();

        config.server.port = 9000;
        store.save(&config).unwrap();

        assert_eq!(store.load().unwrap().server.port, 9000);
        let backups = fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_corrupt_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        assert!(matches!(store.load(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_HOST, "127.0.0.1"),
            (ENV_PORT, " 8123 "),
            (ENV_UPLOAD_DIR, "/tmp/subs"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.storage.upload_dir, PathBuf::from("/tmp/subs"));
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == ENV_PORT).then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
