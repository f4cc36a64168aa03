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

use crate::config::DownloadConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Total attempts, including the first
    pub max_retries: usize,
    pub initial_backoff: Duration,
    pub max_size: u64,
    pub require_https: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&DownloadConfig::default())
    }
}

impl From<&DownloadConfig> for FetchOptions {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            max_retries: config.max_retries.max(1),
            initial_backoff: config.initial_backoff(),
            max_size: config.max_size,
            require_https: config.require_https,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_download_config() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(300));
        assert_eq!(options.max_redirects, 10);
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.max_size, 512 * 1024 * 1024);
        assert!(options.require_https);
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        let config = DownloadConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(FetchOptions::from(&config).max_retries, 1);
    }
}
