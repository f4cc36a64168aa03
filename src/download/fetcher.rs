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

use super::client::{AttohttpcClient, HttpClient, HttpResponse};
use super::options::FetchOptions;
use super::progress::ProgressReporter;
use crate::cancellation::CancellationToken;
use crate::error::{LazybinError, Result};
use crate::security::verify_https_security;
use log::{debug, warn};
use retry::{OperationResult, delay::Exponential, retry_with_index};
use std::io;
use url::Url;

const CHUNK_SIZE: usize = 8192;

/// Retrieves release archives into memory.
pub struct Fetcher {
    http_client: Box<dyn HttpClient>,
    options: FetchOptions,
    cancellation: CancellationToken,
    progress_reporter: Option<Box<dyn ProgressReporter>>,
}

impl Fetcher {
    pub fn new(options: FetchOptions, cancellation: CancellationToken) -> Self {
        let mut http_client = AttohttpcClient::new();
        http_client.set_timeout(options.timeout);
        Self::with_client(Box::new(http_client), options, cancellation)
    }

    pub fn with_client(
        http_client: Box<dyn HttpClient>,
        options: FetchOptions,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            http_client,
            options,
            cancellation,
            progress_reporter: None,
        }
    }

    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Download `url`, following redirects, and return the whole body.
    ///
    /// Only `NetworkError` is retried, up to `max_retries` attempts in total.
    pub fn fetch(&mut self, url: &str) -> Result<Vec<u8>> {
        Url::parse(url)
            .map_err(|e| LazybinError::InvalidConfig(format!("Invalid download URL {url}: {e}")))?;

        let backoff_ms =
            u64::try_from(self.options.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let delays = Exponential::from_millis_with_factor(backoff_ms, 2.0)
            .take(self.options.max_retries.saturating_sub(1));

        let result = retry_with_index(delays, |current_try| match self.fetch_once(url) {
            Ok(body) => OperationResult::Ok(body),
            Err(e) if e.is_retryable() => {
                warn!("Attempt {current_try} to fetch {url} failed: {e}");
                OperationResult::Retry(e)
            }
            Err(e) => OperationResult::Err(e),
        });

        result.map_err(|e| e.error)
    }

    fn fetch_once(&mut self, url: &str) -> Result<Vec<u8>> {
        let mut current = url.to_string();
        let mut hops = 0usize;

        loop {
            self.cancellation.check()?;
            if self.options.require_https {
                verify_https_security(&current)?;
            }

            debug!("GET {current}");
            let mut response = self.http_client.get(&current)?;
            let status = response.status();

            if (300..400).contains(&status) {
                let Some(location) = response.header("location").map(str::to_string) else {
                    return Err(LazybinError::DownloadFailed {
                        url: current,
                        status_code: status,
                    });
                };

                if hops >= self.options.max_redirects {
                    return Err(LazybinError::RedirectLoop {
                        url: url.to_string(),
                        hops: hops + 1,
                    });
                }
                hops += 1;

                let next = resolve_location(&current, &location).ok_or_else(|| {
                    LazybinError::DownloadFailed {
                        url: current.clone(),
                        status_code: status,
                    }
                })?;
                debug!("Redirect {hops} ({status}): {current} -> {next}");
                current = next;
                continue;
            }

            if !(200..300).contains(&status) {
                return Err(LazybinError::DownloadFailed {
                    url: current,
                    status_code: status,
                });
            }

            return self.read_body(&current, response.as_mut());
        }
    }

    fn read_body(&mut self, url: &str, response: &mut dyn HttpResponse) -> Result<Vec<u8>> {
        let max_size = self.options.max_size;
        let declared = response.content_length();

        if let Some(length) = declared {
            if length > max_size {
                return Err(LazybinError::DownloadTooLarge {
                    url: url.to_string(),
                    max_size,
                });
            }
        }

        if let Some(reporter) = self.progress_reporter.as_mut() {
            reporter.on_start(declared.unwrap_or(0));
        }

        let capacity = declared.unwrap_or(0).min(max_size) as usize;
        let mut body = Vec::with_capacity(capacity);
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            self.cancellation.check()?;

            let n = match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(LazybinError::NetworkError(format!(
                        "Failed to read response body from {url}: {e}"
                    )));
                }
            };

            if (body.len() + n) as u64 > max_size {
                return Err(LazybinError::DownloadTooLarge {
                    url: url.to_string(),
                    max_size,
                });
            }
            body.extend_from_slice(&buffer[..n]);

            if let Some(reporter) = self.progress_reporter.as_mut() {
                reporter.on_progress(body.len() as u64);
            }
        }

        if let Some(reporter) = self.progress_reporter.as_mut() {
            reporter.on_complete();
        }

        debug!("Fetched {} bytes from {url}", body.len());
        Ok(body)
    }
}

/// Resolve a `Location` header against the URL that produced it.
fn resolve_location(base: &str, location: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(location.trim()).ok().map(String::from)
}

#[cfg(test)]
#[path = "fetcher_tests.rs"]
mod tests;
