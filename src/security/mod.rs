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
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use url::Url;

const CHUNK_SIZE: usize = 8192;

/// Lowercase hex sha256 of a file's contents.
pub fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = File::open(file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; CHUNK_SIZE];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare a file's sha256 against `expected` (case-insensitive hex).
///
/// Returns the computed digest so callers can record it.
pub fn verify_sha256(file_path: &Path, expected: &str) -> Result<String> {
    let actual = calculate_sha256(file_path)?;

    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(LazybinError::ChecksumMismatch {
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        });
    }

    log::debug!("Checksum verified successfully for {file_path:?}");
    Ok(actual)
}

pub fn verify_https_security(url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| LazybinError::SecurityError(format!("Invalid URL {url}: {e}")))?;

    if parsed.scheme() != "https" {
        return Err(LazybinError::SecurityError(format!(
            "Insecure URL: {url}. Only HTTPS URLs are allowed for release downloads"
        )));
    }

    // Parsing already collapses dot segments, so look at the path as written.
    // Query strings (signed asset URLs) may legitimately contain "..".
    let raw_path = url.split(['?', '#']).next().unwrap_or(url);
    if raw_path.split('/').any(is_parent_segment) {
        return Err(LazybinError::SecurityError(format!(
            "Suspicious URL detected: {url}"
        )));
    }

    Ok(())
}

fn is_parent_segment(segment: &str) -> bool {
    segment == ".." || segment.eq_ignore_ascii_case("%2e%2e")
}
