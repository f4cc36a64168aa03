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
use semver::Version;

/// Normalize a user-supplied version for use in release URLs.
///
/// Surrounding whitespace and a single leading `v`/`V` are dropped; the rest
/// must be a semantic version (`1.2.0`, `2.0.0-rc.1`, `1.0.0+build.5`).
pub fn normalize_version(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if stripped.is_empty() {
        return Err(LazybinError::InvalidVersion(raw.to_string()));
    }

    let version = Version::parse(stripped).map_err(|e| {
        log::debug!("Rejected version {raw:?}: {e}");
        LazybinError::InvalidVersion(raw.to_string())
    })?;

    Ok(version.to_string())
}
