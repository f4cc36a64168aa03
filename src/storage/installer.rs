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
use super::hygiene::{STALE_STAGING_AGE, StagingSweeper};
use super::repository::{EntryStatus, VersionRepository};
use crate::archive::extract_single;
use crate::cancellation::CancellationToken;
use crate::error::{LazybinError, Result};
use crate::paths::versions::{
    STAGING_PREFIX, ensure_staging_root, entry_dir_name, executable_path,
};
use crate::platform::file_ops::{make_executable, permission_mode};
use crate::platform::with_executable_extension;
use crate::release::ReleaseDescriptor;
use crate::security::{calculate_sha256, verify_sha256};
use chrono::Utc;
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Turns downloaded archive bytes into an active cache entry.
///
/// All work happens in a private staging directory under `versions/.tmp`;
/// the entry only becomes visible through a single directory rename.
pub struct ArchiveInstaller<'a> {
    repository: &'a VersionRepository,
    binary: String,
    cancellation: CancellationToken,
    replace: bool,
}

impl<'a> ArchiveInstaller<'a> {
    pub fn new(
        repository: &'a VersionRepository,
        binary: &str,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            repository,
            binary: with_executable_extension(binary),
            cancellation,
            replace: false,
        }
    }

    /// Swap out a valid existing entry once the new copy is fully staged.
    ///
    /// Without this a valid entry at the destination wins and the staged
    /// copy is discarded.
    pub fn replacing(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn install(&self, descriptor: &ReleaseDescriptor, archive: &[u8]) -> Result<CacheEntry> {
        self.cancellation.check()?;

        let staging_root = ensure_staging_root(self.repository.home())?;
        StagingSweeper::new(staging_root.clone(), STALE_STAGING_AGE).run();
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&staging_root)?;
        debug!("Staging install of {} in {}", descriptor.version, staging.path().display());

        let mut archive_file = tempfile::Builder::new()
            .prefix("archive-")
            .suffix(&format!(".{}", descriptor.archive_format.extension()))
            .tempfile_in(staging.path())?;
        archive_file.write_all(archive)?;
        archive_file.flush()?;

        let staged_dir = staging
            .path()
            .join(entry_dir_name(&descriptor.version, descriptor.platform));
        fs::create_dir(&staged_dir)?;

        let entry = self.stage_entry(descriptor, &archive_file, &staged_dir)?;
        drop(archive_file);

        self.cancellation.check()?;

        let final_dir = self
            .repository
            .entry_dir(&descriptor.version, descriptor.platform);
        let retired_dir = staging.path().join("previous");
        let entry = self.commit(descriptor, entry, &staged_dir, &final_dir, &retired_dir)?;

        self.repository.activate(&entry)?;
        info!(
            "Installed {} {} for {}",
            self.binary, entry.version, entry.platform
        );
        Ok(entry)
    }

    /// Extract, verify and describe the executable inside `staged_dir`.
    fn stage_entry(
        &self,
        descriptor: &ReleaseDescriptor,
        archive_file: &NamedTempFile,
        staged_dir: &Path,
    ) -> Result<CacheEntry> {
        let executable = executable_path(staged_dir, &self.binary);
        extract_single(
            archive_file.path(),
            descriptor.archive_format,
            &self.binary,
            &executable,
        )?;

        self.cancellation.check()?;

        let checksum = match descriptor.expected_checksum.as_deref() {
            Some(expected) => verify_sha256(&executable, expected)?,
            None => calculate_sha256(&executable)?,
        };

        make_executable(&executable).map_err(|e| {
            LazybinError::ExtractionFailed(format!(
                "Failed to set permissions on {}: {e}",
                executable.display()
            ))
        })?;
        let permissions = permission_mode(&executable)?;

        let entry = CacheEntry {
            version: descriptor.version.clone(),
            platform: descriptor.platform,
            binary: self.binary.clone(),
            permissions,
            checksum,
            installed_at: Utc::now(),
            installed_path: executable,
        };
        entry.save(staged_dir)?;
        Ok(entry)
    }

    /// Move the staged entry into place.
    ///
    /// Losing the rename to another installer is fine as long as the winner
    /// left a valid entry; an invalid leftover is removed and the rename
    /// retried once. When replacing, a valid entry is first moved to
    /// `retired_dir`, which is dropped together with the staging directory.
    fn commit(
        &self,
        descriptor: &ReleaseDescriptor,
        entry: CacheEntry,
        staged_dir: &Path,
        final_dir: &Path,
        retired_dir: &Path,
    ) -> Result<CacheEntry> {
        let expected = descriptor.expected_checksum.as_deref();
        let mut retried = false;
        let mut retired = false;

        loop {
            let error = match fs::rename(staged_dir, final_dir) {
                Ok(()) => return Ok(entry.relocated(final_dir)),
                Err(e) => e,
            };

            match self.repository.inspect(
                final_dir,
                &descriptor.version,
                descriptor.platform,
                expected,
            ) {
                EntryStatus::Valid(_) if self.replace && !retired => {
                    debug!("Retiring previous installation at {}", final_dir.display());
                    fs::rename(final_dir, retired_dir).map_err(|e| {
                        LazybinError::ExtractionFailed(format!(
                            "Failed to move previous installation {} aside: {e}",
                            final_dir.display()
                        ))
                    })?;
                    retired = true;
                }
                EntryStatus::Valid(existing) => {
                    debug!(
                        "{} was installed concurrently, discarding staged copy",
                        final_dir.display()
                    );
                    return Ok(existing);
                }
                EntryStatus::Invalid(reason) if !retried => {
                    warn!(
                        "Replacing invalid installation at {}: {reason}",
                        final_dir.display()
                    );
                    self.repository.invalidate(final_dir)?;
                    retried = true;
                }
                _ => {
                    if retired && !final_dir.exists() {
                        if let Err(e) = fs::rename(retired_dir, final_dir) {
                            warn!(
                                "Failed to restore previous installation {}: {e}",
                                final_dir.display()
                            );
                        }
                    }
                    return Err(LazybinError::ExtractionFailed(format!(
                        "Failed to move staged installation to {}: {error}",
                        final_dir.display()
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::home::current_link;
    use crate::paths::versions::staging_root;
    use crate::test::fixtures::{darwin_descriptor, linux_descriptor, tar_gz_with, zip_with};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    const SCRIPT: &[u8] = b"#!/bin/sh\necho bl\n";

    fn bin() -> String {
        with_executable_extension("bl")
    }

    fn setup() -> (VersionRepository, TempDir) {
        let temp = TempDir::new().unwrap();
        (VersionRepository::new(temp.path().to_path_buf()), temp)
    }

    fn staging_is_empty(repository: &VersionRepository) -> bool {
        let root = staging_root(repository.home());
        !root.exists() || fs::read_dir(root).unwrap().next().is_none()
    }

    #[test]
    fn test_install_tar_gz() {
        let (repository, _temp) = setup();
        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());
        let nested = format!("bl-cli/{}", bin());
        let archive = tar_gz_with(&[
            ("bl-cli/README.md", b"docs".as_slice()),
            (nested.as_str(), SCRIPT),
        ]);

        let entry = installer.install(&linux_descriptor("v2.0.0"), &archive).unwrap();

        assert_eq!(entry.version, "2.0.0");
        assert_eq!(
            entry.installed_path,
            repository.entry_dir("2.0.0", entry.platform).join(bin())
        );
        assert_eq!(fs::read(&entry.installed_path).unwrap(), SCRIPT);
        assert_eq!(entry.checksum, calculate_sha256(&entry.installed_path).unwrap());
        assert_eq!(
            repository.current().unwrap(),
            entry.entry_dir().map(Path::to_path_buf)
        );
        assert!(staging_is_empty(&repository));

        #[cfg(unix)]
        assert_eq!(entry.permissions, 0o755);
    }

    #[test]
    fn test_install_zip_is_valid_afterwards() {
        let (repository, _temp) = setup();
        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());
        let archive = zip_with(&[(bin().as_str(), SCRIPT)]);
        let descriptor = darwin_descriptor("1.2.0");

        installer.install(&descriptor, &archive).unwrap();

        let found = repository
            .lookup("1.2.0", descriptor.platform, None)
            .unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn test_corrupt_archive_leaves_cache_unchanged() {
        let (repository, _temp) = setup();
        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());

        let good = installer
            .install(&linux_descriptor("1.0.0"), &tar_gz_with(&[(bin().as_str(), SCRIPT)]))
            .unwrap();

        let result = installer.install(&linux_descriptor("2.0.0"), b"definitely not gzip");

        assert!(matches!(result, Err(LazybinError::ArchiveCorrupt(_))));
        assert!(!repository.entry_dir("2.0.0", good.platform).exists());
        assert_eq!(
            repository.current().unwrap(),
            good.entry_dir().map(Path::to_path_buf)
        );
        assert_eq!(repository.list().unwrap().len(), 1);
        assert!(staging_is_empty(&repository));
    }

    #[test]
    fn test_missing_binary_is_corrupt() {
        let (repository, _temp) = setup();
        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());

        let result = installer.install(
            &linux_descriptor("1.0.0"),
            &tar_gz_with(&[("README.md", b"no binary here".as_slice())]),
        );

        assert!(matches!(result, Err(LazybinError::ArchiveCorrupt(_))));
        assert!(repository.list().unwrap().is_empty());
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let (repository, _temp) = setup();
        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());
        let mut descriptor = linux_descriptor("1.0.0");
        descriptor.expected_checksum = Some("0".repeat(64));

        let archive = tar_gz_with(&[(bin().as_str(), SCRIPT)]);
        let result = installer.install(&descriptor, &archive);

        assert!(matches!(result, Err(LazybinError::ChecksumMismatch { .. })));
        assert!(!repository.entry_dir("1.0.0", descriptor.platform).exists());
        assert!(!current_link(repository.home()).exists());
    }

    #[test]
    fn test_matching_checksum_accepted() {
        let (repository, temp) = setup();
        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());
        let script_path = temp.path().join("script");
        fs::write(&script_path, SCRIPT).unwrap();

        let mut descriptor = linux_descriptor("1.0.0");
        descriptor.expected_checksum = Some(calculate_sha256(&script_path).unwrap());

        let entry = installer
            .install(&descriptor, &tar_gz_with(&[(bin().as_str(), SCRIPT)]))
            .unwrap();
        assert_eq!(Some(entry.checksum), descriptor.expected_checksum);
    }

    #[test]
    fn test_cancelled_install_changes_nothing() {
        let (repository, _temp) = setup();
        let token = CancellationToken::new();
        token.cancel();
        let installer = ArchiveInstaller::new(&repository, "bl", token);

        let archive = tar_gz_with(&[(bin().as_str(), SCRIPT)]);
        let result = installer.install(&linux_descriptor("1.0.0"), &archive);

        assert!(matches!(result, Err(LazybinError::Cancelled)));
        assert!(repository.list().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_leftover_is_replaced() {
        let (repository, _temp) = setup();
        let descriptor = linux_descriptor("1.0.0");
        let leftover = repository.entry_dir("1.0.0", descriptor.platform);
        fs::create_dir_all(&leftover).unwrap();
        fs::write(leftover.join(bin()), b"partial").unwrap();

        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());
        let entry = installer
            .install(&descriptor, &tar_gz_with(&[(bin().as_str(), SCRIPT)]))
            .unwrap();

        assert_eq!(fs::read(&entry.installed_path).unwrap(), SCRIPT);
        assert!(matches!(
            repository.inspect(&leftover, "1.0.0", descriptor.platform, None),
            EntryStatus::Valid(_)
        ));
    }

    #[test]
    fn test_valid_entry_wins_without_replace() {
        let (repository, _temp) = setup();
        let installer = ArchiveInstaller::new(&repository, "bl", CancellationToken::new());
        let descriptor = linux_descriptor("1.0.0");
        installer
            .install(&descriptor, &tar_gz_with(&[(bin().as_str(), SCRIPT)]))
            .unwrap();

        let updated: &[u8] = b"#!/bin/sh\necho new\n";
        let entry = installer
            .install(&descriptor, &tar_gz_with(&[(bin().as_str(), updated)]))
            .unwrap();

        assert_eq!(fs::read(&entry.installed_path).unwrap(), SCRIPT);
        assert!(staging_is_empty(&repository));
    }

    #[test]
    fn test_replacing_swaps_valid_entry() {
        let (repository, _temp) = setup();
        let descriptor = linux_descriptor("1.0.0");
        ArchiveInstaller::new(&repository, "bl", CancellationToken::new())
            .install(&descriptor, &tar_gz_with(&[(bin().as_str(), SCRIPT)]))
            .unwrap();

        let updated: &[u8] = b"#!/bin/sh\necho new\n";
        let entry = ArchiveInstaller::new(&repository, "bl", CancellationToken::new())
            .replacing(true)
            .install(&descriptor, &tar_gz_with(&[(bin().as_str(), updated)]))
            .unwrap();

        let dir = repository.entry_dir("1.0.0", descriptor.platform);
        assert_eq!(entry.installed_path, dir.join(bin()));
        assert_eq!(fs::read(&entry.installed_path).unwrap(), updated);
        assert!(matches!(
            repository.inspect(&dir, "1.0.0", descriptor.platform, None),
            EntryStatus::Valid(_)
        ));
        assert_eq!(repository.current().unwrap(), Some(dir));
        assert!(staging_is_empty(&repository));
    }

    #[test]
    fn test_failed_replacement_keeps_previous_entry() {
        let (repository, _temp) = setup();
        let descriptor = linux_descriptor("1.0.0");
        let previous = ArchiveInstaller::new(&repository, "bl", CancellationToken::new())
            .install(&descriptor, &tar_gz_with(&[(bin().as_str(), SCRIPT)]))
            .unwrap();

        let result = ArchiveInstaller::new(&repository, "bl", CancellationToken::new())
            .replacing(true)
            .install(&descriptor, b"definitely not gzip");

        assert!(matches!(result, Err(LazybinError::ArchiveCorrupt(_))));
        assert_eq!(fs::read(&previous.installed_path).unwrap(), SCRIPT);
        assert!(
            repository
                .lookup("1.0.0", descriptor.platform, None)
                .unwrap()
                .is_some()
        );
        assert_eq!(
            repository.current().unwrap(),
            previous.entry_dir().map(Path::to_path_buf)
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_abandoned_staging_is_swept() {
        let (repository, _temp) = setup();
        let abandoned = ensure_staging_root(repository.home())
            .unwrap()
            .join(format!("{STAGING_PREFIX}killed"));
        fs::create_dir(&abandoned).unwrap();
        fs::write(abandoned.join("archive.tar.gz"), b"partial").unwrap();
        let old = std::time::SystemTime::now() - STALE_STAGING_AGE * 2;
        fs::File::open(&abandoned).unwrap().set_modified(old).unwrap();

        ArchiveInstaller::new(&repository, "bl", CancellationToken::new())
            .install(&linux_descriptor("1.0.0"), &tar_gz_with(&[(bin().as_str(), SCRIPT)]))
            .unwrap();

        assert!(!abandoned.exists());
        assert!(staging_is_empty(&repository));
    }

    #[test]
    fn test_concurrent_installs_converge() {
        let (repository, _temp) = setup();
        let repository = Arc::new(repository);
        let archive = Arc::new(tar_gz_with(&[(bin().as_str(), SCRIPT)]));
        let descriptor = linux_descriptor("1.2.0");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let repository = Arc::clone(&repository);
                let archive = Arc::clone(&archive);
                let descriptor = descriptor.clone();
                thread::spawn(move || {
                    let installer =
                        ArchiveInstaller::new(&repository, "bl", CancellationToken::new());
                    installer.install(&descriptor, &archive)
                })
            })
            .collect();

        let entries: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let dir = repository.entry_dir("1.2.0", descriptor.platform);
        for entry in &entries {
            assert_eq!(entry.installed_path, dir.join(bin()));
            assert_eq!(entry.checksum, entries[0].checksum);
        }
        assert!(matches!(
            repository.inspect(&dir, "1.2.0", descriptor.platform, None),
            EntryStatus::Valid(_)
        ));
        assert_eq!(repository.list().unwrap().len(), 1);
        assert_eq!(repository.current().unwrap(), Some(dir));
        assert!(staging_is_empty(&repository));
    }
}
