// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{LazybinError, Result};
use crate::paths;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const HOME_ENV_VAR: &str = "LAZYBIN_HOME";
const ENV_PREFIX: &str = "LAZYBIN";

const DEFAULT_BASE_URL: &str = "https://github.com";
const DEFAULT_REPOSITORY: &str = "KimMaru10/bl-cli";
const DEFAULT_PROJECT: &str = "bl-cli";
const DEFAULT_BINARY: &str = "bl";

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
const DEFAULT_MAX_SIZE: u64 = 512 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LazybinConfig {
    /// Installation home; not read from the config file itself
    #[serde(skip)]
    home: PathBuf,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

/// Where releases live and which one the launcher requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Version the launcher runs. Defaults to the launcher's own version so a
    /// wrapper package pins the tool release it was published with.
    pub version: String,
    pub repository: String,
    pub project: String,
    /// Name of the executable inside the release archive
    pub binary: String,
    pub base_url: String,
    /// Expected sha256 of the extracted executable
    pub checksum: Option<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            binary: DEFAULT_BINARY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            checksum: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    /// Total attempts for network failures, including the first one
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_size: u64,
    pub require_https: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_size: DEFAULT_MAX_SIZE,
            require_https: true,
        }
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

impl LazybinConfig {
    /// Configuration with defaults only, rooted at `home`.
    pub fn with_home(home: PathBuf) -> Self {
        Self {
            home,
            ..Default::default()
        }
    }

    /// Load configuration layered as defaults, `config.toml` in `home`, then
    /// `LAZYBIN_*` environment variables (`__` separates sections).
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);
        log::debug!("Loading config from {config_path:?}");

        let settings = Config::builder()
            .add_source(
                File::from(config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| LazybinError::ConfigError(format!("Failed to load config: {e}")))?;

        let mut config: LazybinConfig = settings
            .try_deserialize()
            .map_err(|e| LazybinError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.home = home.to_path_buf();
        config.validate()?;

        Ok(config)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    fn validate(&self) -> Result<()> {
        if self.release.binary.trim().is_empty() {
            return Err(LazybinError::InvalidConfig(
                "release.binary must not be empty".to_string(),
            ));
        }
        if self.download.max_retries == 0 {
            return Err(LazybinError::InvalidConfig(
                "download.max_retries must be at least 1".to_string(),
            ));
        }
        if self.download.timeout_secs == 0 {
            return Err(LazybinError::InvalidConfig(
                "download.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve the installation home from `LAZYBIN_HOME` or `~/.lazybin`.
pub fn resolve_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir()
        .map(|home| home.join(paths::DEFAULT_HOME_DIR_NAME))
        .ok_or_else(|| {
            LazybinError::ConfigError(format!(
                "Unable to determine home directory; set {HOME_ENV_VAR}"
            ))
        })
}

/// Load the configuration for the resolved home directory.
pub fn new_lazybin_config() -> Result<LazybinConfig> {
    let home = resolve_home()?;
    LazybinConfig::load(&home)
}
