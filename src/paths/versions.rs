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

use crate::error::Result;
use crate::paths::home::{ensure_directory, versions_dir};
use crate::platform::PlatformId;
use std::path::{Path, PathBuf};

pub const STAGING_DIR: &str = ".tmp";
/// Name prefix of each installer's private directory under the staging root.
pub const STAGING_PREFIX: &str = "install-";
pub const SIDECAR_FILE: &str = "install.json";

/// Directory name for one installed version/platform pair, e.g. `1.2.0-linux-amd64`.
pub fn entry_dir_name(version: &str, platform: PlatformId) -> String {
    format!("{version}-{}", platform.cache_key())
}

pub fn entry_dir(home: &Path, version: &str, platform: PlatformId) -> PathBuf {
    versions_dir(home).join(entry_dir_name(version, platform))
}

pub fn executable_path(entry_dir: &Path, binary_name: &str) -> PathBuf {
    entry_dir.join(binary_name)
}

pub fn sidecar_path(entry_dir: &Path) -> PathBuf {
    entry_dir.join(SIDECAR_FILE)
}

/// Staging root. It sits inside `versions/` so the final rename never
/// crosses a filesystem boundary.
pub fn staging_root(home: &Path) -> PathBuf {
    versions_dir(home).join(STAGING_DIR)
}

pub fn ensure_staging_root(home: &Path) -> Result<PathBuf> {
    ensure_directory(staging_root(home))
}
