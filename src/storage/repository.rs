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

use super::entry::CacheEntry;
use crate::error::{LazybinError, Result};
use crate::paths::home::{current_link, versions_dir};
use crate::paths::versions::{STAGING_DIR, entry_dir};
use crate::platform::{PlatformId, with_executable_extension};
use crate::platform::symlink::{read_pointer, remove_pointer, replace_pointer};
use crate::security::calculate_sha256;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of checking an entry directory.
#[derive(Debug)]
pub enum EntryStatus {
    Valid(CacheEntry),
    Missing,
    Invalid(String),
}

/// Installed versions under `$LAZYBIN_HOME/versions`.
pub struct VersionRepository {
    home: PathBuf,
    binary: Option<String>,
}

impl VersionRepository {
    pub fn new(home: PathBuf) -> Self {
        Self { home, binary: None }
    }

    /// Only accept entries whose executable is named `binary`.
    pub fn for_binary(mut self, binary: &str) -> Self {
        self.binary = Some(with_executable_extension(binary));
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn versions_dir(&self) -> PathBuf {
        versions_dir(&self.home)
    }

    pub fn entry_dir(&self, version: &str, platform: PlatformId) -> PathBuf {
        entry_dir(&self.home, version, platform)
    }

    /// Find a usable entry. Invalid entries are removed and reported as absent.
    pub fn lookup(
        &self,
        version: &str,
        platform: PlatformId,
        expected_checksum: Option<&str>,
    ) -> Result<Option<CacheEntry>> {
        let dir = self.entry_dir(version, platform);

        match self.inspect(&dir, version, platform, expected_checksum) {
            EntryStatus::Valid(entry) => Ok(Some(entry)),
            EntryStatus::Missing => Ok(None),
            EntryStatus::Invalid(reason) => {
                log::warn!("Discarding invalid installation at {}: {reason}", dir.display());
                self.invalidate(&dir)?;
                Ok(None)
            }
        }
    }

    /// Check that `dir` holds a complete, untampered entry for `version`/`platform`.
    pub fn inspect(
        &self,
        dir: &Path,
        version: &str,
        platform: PlatformId,
        expected_checksum: Option<&str>,
    ) -> EntryStatus {
        if !dir.exists() {
            return EntryStatus::Missing;
        }

        let entry = match CacheEntry::load(dir) {
            Ok(entry) => entry,
            Err(e) => return EntryStatus::Invalid(format!("unreadable install record: {e}")),
        };

        if entry.version != version || entry.platform != platform {
            return EntryStatus::Invalid(format!(
                "install record describes {} for {}",
                entry.version, entry.platform
            ));
        }

        if let Some(binary) = &self.binary {
            if &entry.binary != binary {
                return EntryStatus::Invalid(format!(
                    "install record is for executable '{}', expected '{binary}'",
                    entry.binary
                ));
            }
        }

        if !entry.installed_path.is_file() {
            return EntryStatus::Invalid(format!(
                "executable {} is missing",
                entry.installed_path.display()
            ));
        }

        let actual = match calculate_sha256(&entry.installed_path) {
            Ok(actual) => actual,
            Err(e) => return EntryStatus::Invalid(format!("cannot hash executable: {e}")),
        };

        if !actual.eq_ignore_ascii_case(&entry.checksum) {
            return EntryStatus::Invalid(format!(
                "checksum {actual} does not match recorded {}",
                entry.checksum
            ));
        }

        if let Some(expected) = expected_checksum {
            if !actual.eq_ignore_ascii_case(expected) {
                return EntryStatus::Invalid(format!(
                    "checksum {actual} does not match configured {expected}"
                ));
            }
        }

        EntryStatus::Valid(entry)
    }

    /// Delete an entry directory, dropping `current` if it pointed there.
    pub fn invalidate(&self, dir: &Path) -> Result<()> {
        if !dir.starts_with(self.versions_dir()) {
            return Err(LazybinError::SecurityError(format!(
                "Refusing to remove directory outside of versions directory: {}",
                dir.display()
            )));
        }

        if self.current()?.as_deref() == Some(dir) {
            remove_pointer(&current_link(&self.home))?;
        }

        match fs::remove_dir_all(dir) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Remove an installed version.
    pub fn remove(&self, version: &str, platform: PlatformId) -> Result<PathBuf> {
        let dir = self.entry_dir(version, platform);
        if !dir.exists() {
            return Err(LazybinError::NotInstalled {
                version: version.to_string(),
                platform: platform.to_string(),
            });
        }

        self.invalidate(&dir)?;
        Ok(dir)
    }

    /// All entries whose install record can be read, ordered by version.
    ///
    /// Checksums are not verified here; `lookup` does that before use.
    pub fn list(&self) -> Result<Vec<CacheEntry>> {
        let versions_dir = self.versions_dir();
        if !versions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&versions_dir)? {
            let path = dir_entry?.path();
            if !path.is_dir() || path.file_name().is_some_and(|n| n == STAGING_DIR) {
                continue;
            }

            match CacheEntry::load(&path) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::debug!("Skipping {}: {e}", path.display()),
            }
        }

        entries.sort_by(|a, b| {
            let order = match (
                semver::Version::parse(&a.version),
                semver::Version::parse(&b.version),
            ) {
                (Ok(va), Ok(vb)) => va.cmp(&vb),
                _ => a.version.cmp(&b.version),
            };
            order.then_with(|| a.platform.to_string().cmp(&b.platform.to_string()))
        });

        Ok(entries)
    }

    /// Atomically point `current` at `entry`.
    pub fn activate(&self, entry: &CacheEntry) -> Result<()> {
        let dir = entry.entry_dir().ok_or_else(|| {
            LazybinError::ExtractionFailed(format!(
                "Installed path has no parent: {}",
                entry.installed_path.display()
            ))
        })?;

        replace_pointer(dir, &current_link(&self.home))?;
        log::debug!("Activated {}", dir.display());
        Ok(())
    }

    /// Entry directory `current` points at, if any.
    pub fn current(&self) -> Result<Option<PathBuf>> {
        Ok(read_pointer(&current_link(&self.home))?)
    }
}
