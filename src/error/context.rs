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

use crate::error::LazybinError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a LazybinError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a LazybinError) -> Self {
        let (suggestion, details) = match error {
            LazybinError::UnsupportedPlatform { os, arch } => {
                let suggestion = Some(
                    "Prebuilt binaries exist for darwin and linux on amd64 and arm64. Please \
                     file a support request including the platform shown above."
                        .to_string(),
                );
                let details = Some(format!("Platform resolution failed: os={os}, arch={arch}"));
                (suggestion, details)
            }
            LazybinError::InvalidVersion(version) => {
                let suggestion = Some(
                    "Use a semantic version such as '1.2.0' or 'v1.2.0' (set \
                     LAZYBIN_RELEASE__VERSION or release.version in config.toml)."
                        .to_string(),
                );
                let details = Some(format!("Release lookup failed for version '{version}'"));
                (suggestion, details)
            }
            LazybinError::NetworkError(msg) => {
                let suggestion = Some(
                    "Check your internet connection and proxy settings, then run the command \
                     again."
                        .to_string(),
                );
                let details = Some(format!("Download failed after retrying: {msg}"));
                (suggestion, details)
            }
            LazybinError::RedirectLoop { hops, .. } => {
                let suggestion = Some(
                    "The release server keeps redirecting. Try again later or raise \
                     download.max_redirects."
                        .to_string(),
                );
                let details = Some(format!("Download stopped after {hops} redirects"));
                (suggestion, details)
            }
            LazybinError::DownloadFailed { status_code, url } => {
                let suggestion = match status_code {
                    404 => Some(
                        "The release archive was not found. Check that the configured version \
                         has been published for this platform."
                            .to_string(),
                    ),
                    401 | 403 => Some(
                        "Access to the release was denied. Private registries are not supported."
                            .to_string(),
                    ),
                    429 => Some(
                        "Rate limit exceeded. Please wait a few minutes and try again.".to_string(),
                    ),
                    500..=599 => Some("The release server failed. Try again later.".to_string()),
                    _ => Some("Check the release URL and try again.".to_string()),
                };
                let details = Some(format!("Download failed: {url} returned {status_code}"));
                (suggestion, details)
            }
            LazybinError::DownloadTooLarge { .. } => {
                let suggestion = Some(
                    "Raise download.max_size if the release is expected to be this large."
                        .to_string(),
                );
                (suggestion, None)
            }
            LazybinError::ArchiveCorrupt(msg) => {
                let suggestion = Some(
                    "Run the command again to download a fresh copy. If the problem persists the \
                     release archive may be broken at the source."
                        .to_string(),
                );
                let details = Some(format!("Install failed while reading the archive: {msg}"));
                (suggestion, details)
            }
            LazybinError::ExtractionFailed(msg) => {
                let suggestion =
                    Some("Ensure you have enough disk space and try again.".to_string());
                let details = Some(format!("Install failed while extracting: {msg}"));
                (suggestion, details)
            }
            LazybinError::ChecksumMismatch { expected, actual } => {
                let suggestion = Some(
                    "Try installing again. If the problem persists, the file may be corrupted at \
                     the source or the configured checksum is out of date."
                        .to_string(),
                );
                let details = Some(format!(
                    "Install failed during verification. Expected sha256 {expected}, got {actual}"
                ));
                (suggestion, details)
            }
            LazybinError::LaunchFailure { path, .. } => {
                let suggestion = if cfg!(unix) {
                    Some(format!(
                        "The installation is intact but could not be started. Check that {path} \
                         is executable and that the filesystem is not mounted noexec."
                    ))
                } else {
                    Some(format!(
                        "The installation is intact but could not be started. Check that {path} \
                         is not blocked by security software."
                    ))
                };
                (suggestion, None)
            }
            LazybinError::NotInstalled { version, .. } => {
                let suggestion = Some(format!("Run 'lazybin install {version}' to install it."));
                (suggestion, None)
            }
            LazybinError::SecurityError(msg) => {
                let suggestion = Some(
                    "Only HTTPS release URLs are accepted. Check release.base_url.".to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            LazybinError::ConfigError(msg) | LazybinError::InvalidConfig(msg) => {
                let suggestion = Some(
                    "Check $LAZYBIN_HOME/config.toml and LAZYBIN_* environment variables."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            LazybinError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check permissions on the lazybin home directory.".to_string())
                    }
                    std::io::ErrorKind::NotFound => Some(
                        "Ensure the file or directory exists and the path is correct.".to_string(),
                    ),
                    _ => None,
                };
                let details = Some(format!("I/O error: {io_err}"));
                (suggestion, details)
            }
            _ => (None, None),
        };

        Self {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
