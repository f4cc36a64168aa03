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

mod context;
mod exit_codes;
mod format;
#[cfg(test)]
mod tests;

pub use context::ErrorContext;
pub use exit_codes::{LAUNCH_FAILURE_EXIT_CODE, get_exit_code};
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LazybinError {
    #[error("Unsupported platform: os '{os}', architecture '{arch}'")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Invalid version: '{0}'")]
    InvalidVersion(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Too many redirects ({hops}) while fetching {url}")]
    RedirectLoop { url: String, hops: usize },

    #[error("Download failed with HTTP status {status_code}: {url}")]
    DownloadFailed { url: String, status_code: u16 },

    #[error("Download of {url} exceeds the maximum allowed size of {max_size} bytes")]
    DownloadTooLarge { url: String, max_size: u64 },

    #[error("Archive is corrupt: {0}")]
    ArchiveCorrupt(String),

    #[error("Failed to extract archive: {0}")]
    ExtractionFailed(String),

    #[error("Checksum verification failed")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Failed to launch {path}: {reason}")]
    LaunchFailure { path: String, reason: String },

    #[error("Version {version} is not installed for {platform}")]
    NotInstalled { version: String, platform: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LazybinError {
    /// Only transport-level failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LazybinError::NetworkError(_))
    }
}

pub type Result<T> = std::result::Result<T, LazybinError>;
