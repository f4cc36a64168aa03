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

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::platform::{Os, PlatformId};
use crate::release::version::normalize_version;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Fixed policy: macOS releases ship as zip, everything else as tar.gz.
    pub fn for_platform(platform: PlatformId) -> Self {
        match platform.os {
            Os::Darwin => ArchiveFormat::Zip,
            Os::Linux => ArchiveFormat::TarGz,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything needed for one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Normalized version, without any `v` prefix
    pub version: String,
    pub platform: PlatformId,
    pub archive_format: ArchiveFormat,
    pub url: String,
    /// Lowercase hex sha256 of the extracted executable
    pub expected_checksum: Option<String>,
}

impl ReleaseDescriptor {
    /// File name of the release archive, e.g. `bl-cli_1.2.0_darwin_arm64.zip`.
    pub fn archive_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Compute the release descriptor for `version` on `platform`.
///
/// URLs follow the release naming template
/// `{base_url}/{repository}/releases/download/v{version}/{project}_{version}_{os}_{arch}.{ext}`.
pub fn locate(
    version: &str,
    platform: PlatformId,
    release: &ReleaseConfig,
) -> Result<ReleaseDescriptor> {
    let version = normalize_version(version)?;
    let archive_format = ArchiveFormat::for_platform(platform);

    let url = format!(
        "{base}/{repository}/releases/download/v{version}/{project}_{version}_{suffix}.{ext}",
        base = release.base_url.trim_end_matches('/'),
        repository = release.repository.trim_matches('/'),
        project = release.project,
        suffix = platform.artifact_suffix(),
        ext = archive_format.extension(),
    );

    let expected_checksum = release
        .checksum
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_lowercase);

    Ok(ReleaseDescriptor {
        version,
        platform,
        archive_format,
        url,
        expected_checksum,
    })
}
