//! Host-supplied configuration.
//!
//! All knobs are plain scalars. Hosts with a filesystem load them from TOML;
//! the firmware host fills the same struct through the C ABI.
//!
//! ```toml
//! api_key = "0123abcd"
//! update_interval_secs = 300
//! request_timeout_secs = 10     # 0 = default
//! verify_tls = true
//! max_tasks = 10            # 0 = unlimited
//! max_description_len = 100 # 0 = unlimited
//! bucket_cap = 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{TodoistClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::decode::{DecodeLimits, DEFAULT_MAX_DESCRIPTION_LEN, DEFAULT_MAX_TASKS};
use crate::scheduler::{SchedulerConfig, DEFAULT_BUCKET_CAP};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub update_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Skipping verification is opt-in.
    pub verify_tls: bool,
    pub max_tasks: usize,
    pub max_description_len: usize,
    pub bucket_cap: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            update_interval_secs: 300,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            verify_tls: true,
            max_tasks: DEFAULT_MAX_TASKS,
            max_description_len: DEFAULT_MAX_DESCRIPTION_LEN,
            bucket_cap: DEFAULT_BUCKET_CAP,
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_tasks: nonzero(self.max_tasks),
            max_description_len: nonzero(self.max_description_len),
        }
    }

    /// A zero timeout would fail every exchange, so 0 falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }

    pub fn client(&self) -> TodoistClient {
        TodoistClient::new(&self.base_url)
            .with_api_key(self.api_key.clone().unwrap_or_default())
            .with_timeout(self.request_timeout())
            .with_verify_tls(self.verify_tls)
            .with_limits(self.decode_limits())
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            update_interval: Duration::from_secs(self.update_interval_secs),
            request_timeout: self.request_timeout(),
            bucket_cap: self.bucket_cap,
        }
    }
}

fn nonzero(n: usize) -> Option<usize> {
    (n > 0).then_some(n)
}
