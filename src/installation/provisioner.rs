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

use crate::cancellation::CancellationToken;
use crate::config::LazybinConfig;
use crate::download::{FetchOptions, Fetcher, IndicatifProgressReporter};
use crate::error::Result;
use crate::platform::{self, PlatformId};
use crate::release::{ReleaseDescriptor, locate};
use crate::storage::{ArchiveInstaller, CacheEntry, VersionRepository};
use log::{debug, info};

/// Resolves, fetches and installs releases for one configuration.
///
/// The launcher uses it silently; the management CLI turns progress on.
pub struct Provisioner<'a> {
    config: &'a LazybinConfig,
    repository: VersionRepository,
    cancellation: CancellationToken,
    show_progress: bool,
}

impl<'a> Provisioner<'a> {
    pub fn new(config: &'a LazybinConfig, cancellation: CancellationToken) -> Self {
        Self {
            config,
            repository: VersionRepository::new(config.home().to_path_buf())
                .for_binary(&config.release.binary),
            cancellation,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn repository(&self) -> &VersionRepository {
        &self.repository
    }

    /// Descriptor for `version` (or the configured version) on this host.
    pub fn descriptor(&self, version: Option<&str>) -> Result<ReleaseDescriptor> {
        let platform = platform::resolve()?;
        self.descriptor_for(version, platform)
    }

    pub fn descriptor_for(
        &self,
        version: Option<&str>,
        platform: PlatformId,
    ) -> Result<ReleaseDescriptor> {
        let version = version.unwrap_or(&self.config.release.version);
        locate(version, platform, &self.config.release)
    }

    /// The valid installed entry for `descriptor`, if any.
    pub fn find(&self, descriptor: &ReleaseDescriptor) -> Result<Option<CacheEntry>> {
        self.repository.lookup(
            &descriptor.version,
            descriptor.platform,
            descriptor.expected_checksum.as_deref(),
        )
    }

    /// Return the installed entry, installing it first when absent.
    pub fn ensure(&self, descriptor: &ReleaseDescriptor) -> Result<CacheEntry> {
        if let Some(entry) = self.find(descriptor)? {
            debug!("Using cached {}", entry.installed_path.display());
            return Ok(entry);
        }
        self.install(descriptor)
    }

    /// Download and install `descriptor`; a valid entry that appears
    /// meanwhile is kept.
    pub fn install(&self, descriptor: &ReleaseDescriptor) -> Result<CacheEntry> {
        self.fetch_and_install(descriptor, false)
    }

    /// Download and install `descriptor`, replacing any existing entry only
    /// after the new copy has been staged and verified.
    pub fn reinstall(&self, descriptor: &ReleaseDescriptor) -> Result<CacheEntry> {
        self.fetch_and_install(descriptor, true)
    }

    fn fetch_and_install(
        &self,
        descriptor: &ReleaseDescriptor,
        replace: bool,
    ) -> Result<CacheEntry> {
        info!("Downloading {}", descriptor.url);

        let mut fetcher = Fetcher::new(
            FetchOptions::from(&self.config.download),
            self.cancellation.clone(),
        );
        if self.show_progress {
            fetcher = fetcher.with_progress_reporter(Box::new(IndicatifProgressReporter::new(
                descriptor.archive_name(),
            )));
        }

        let archive = fetcher.fetch(&descriptor.url)?;

        ArchiveInstaller::new(
            &self.repository,
            &self.config.release.binary,
            self.cancellation.clone(),
        )
        .replacing(replace)
        .install(descriptor, &archive)
    }
}
