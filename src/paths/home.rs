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
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOME_DIR_NAME: &str = ".lazybin";
pub const VERSIONS_DIR: &str = "versions";
pub const CURRENT_LINK: &str = "current";

pub fn versions_dir(home: &Path) -> PathBuf {
    home.join(VERSIONS_DIR)
}

pub fn current_link(home: &Path) -> PathBuf {
    home.join(CURRENT_LINK)
}

/// Ensure the provided path exists, returning it on success.
pub fn ensure_directory(path: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&path).map_err(|error| {
        LazybinError::ConfigError(format!(
            "Failed to create directory {}: {error}",
            path.display()
        ))
    })?;
    Ok(path)
}

pub fn ensure_versions_dir(home: &Path) -> Result<PathBuf> {
    ensure_directory(versions_dir(home))
}
