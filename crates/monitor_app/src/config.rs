//! Monitor configuration, stored as RON next to the working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use monitor_client::ClientSettings;
use monitor_core::ReconnectPolicy;
use monitor_logging::{monitor_info, monitor_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "./pai_monitor.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub server_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub reconnect_delay_ms: u64,
    /// Consecutive stream failures tolerated per job. `None` keeps retrying.
    pub max_reconnect_attempts: Option<u32>,
    pub notice_duration_ms: u64,
    /// Filter applied when a command names no file types.
    pub default_file_types: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let reconnect = ReconnectPolicy::default();
        Self {
            server_url: client.server_url,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            reconnect_delay_ms: reconnect.delay.as_millis() as u64,
            max_reconnect_attempts: reconnect.max_attempts,
            notice_duration_ms: 3_000,
            default_file_types: Vec::new(),
        }
    }
}

impl MonitorConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            server_url: self.server_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            delay: Duration::from_millis(self.reconnect_delay_ms),
            max_attempts: self.max_reconnect_attempts,
        }
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}

/// Reads the config at `path`. A missing file is created with defaults; an
/// unparsable one is reported and replaced by defaults in memory only.
pub fn load_or_init(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let config = MonitorConfig::default();
            save(path, &config)?;
            monitor_info!("Wrote default config to {:?}", path);
            return Ok(config);
        }
        Err(err) => return Err(err.into()),
    };

    match ron::from_str(&content) {
        Ok(config) => {
            monitor_info!("Loaded config from {:?}", path);
            Ok(config)
        }
        Err(err) => {
            monitor_warn!("Failed to parse config {:?}: {}; using defaults", path, err);
            Ok(MonitorConfig::default())
        }
    }
}

/// Writes through a temp file in the target directory, then renames.
pub fn save(path: &Path, config: &MonitorConfig) -> Result<(), ConfigError> {
    let content = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::new())?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| ConfigError::Io(e.error))?;
    Ok(())
}
