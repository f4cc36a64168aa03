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
use crate::paths::versions::{executable_path, sidecar_path};
use crate::platform::PlatformId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// An installed executable plus the record written next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub version: String,
    pub platform: PlatformId,
    /// File name of the executable inside the entry directory
    pub binary: String,
    /// Unix permission bits applied at install time
    pub permissions: u32,
    /// Lowercase hex sha256 of the executable
    pub checksum: String,
    pub installed_at: DateTime<Utc>,
    #[serde(skip)]
    pub installed_path: PathBuf,
}

impl CacheEntry {
    /// Read the sidecar in `entry_dir`.
    pub fn load(entry_dir: &Path) -> Result<Self> {
        let content = fs::read_to_string(sidecar_path(entry_dir))?;
        let mut entry: CacheEntry = serde_json::from_str(&content)?;
        entry.installed_path = executable_path(entry_dir, &entry.binary);
        Ok(entry)
    }

    /// Write the sidecar into `entry_dir`.
    pub fn save(&self, entry_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(sidecar_path(entry_dir), json)?;
        Ok(())
    }

    /// Directory holding the executable and its sidecar.
    pub fn entry_dir(&self) -> Option<&Path> {
        self.installed_path.parent()
    }

    /// Same entry as seen from another directory, e.g. after a rename.
    pub fn relocated(mut self, entry_dir: &Path) -> Self {
        self.installed_path = executable_path(entry_dir, &self.binary);
        self
    }
}
