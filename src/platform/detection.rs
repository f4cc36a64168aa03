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

//! Maps the host operating system and CPU architecture onto the platform
//! names used by the release pipeline.

use crate::error::{LazybinError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Operating systems the release pipeline publishes binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Darwin,
    Linux,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
        }
    }

    /// Accepts Rust's `target_os` names as well as release names.
    pub fn from_host_name(name: &str) -> Option<Self> {
        match name {
            "macos" | "darwin" => Some(Os::Darwin),
            "linux" => Some(Os::Linux),
            _ => None,
        }
    }
}

/// CPU architectures the release pipeline publishes binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }

    /// Accepts Rust's `target_arch` names, Node-style `x64`, and release names.
    pub fn from_host_name(name: &str) -> Option<Self> {
        match name {
            "x86_64" | "x64" | "amd64" => Some(Arch::Amd64),
            "aarch64" | "arm64" => Some(Arch::Arm64),
            _ => None,
        }
    }
}

/// A supported `{os, arch}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformId {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformId {
    pub const SUPPORTED: [PlatformId; 4] = [
        PlatformId::new(Os::Darwin, Arch::Amd64),
        PlatformId::new(Os::Darwin, Arch::Arm64),
        PlatformId::new(Os::Linux, Arch::Amd64),
        PlatformId::new(Os::Linux, Arch::Arm64),
    ];

    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Map raw host values onto a platform. Unsupported values are reported
    /// verbatim so users can include them in a support request.
    pub fn from_host(os: &str, arch: &str) -> Result<Self> {
        match (Os::from_host_name(os), Arch::from_host_name(arch)) {
            (Some(os), Some(arch)) => Ok(Self::new(os, arch)),
            _ => Err(LazybinError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// Fragment used in release artifact names, e.g. `darwin_arm64`.
    pub fn artifact_suffix(&self) -> String {
        format!("{}_{}", self.os.as_str(), self.arch.as_str())
    }

    /// Fragment used in cache directory names, e.g. `darwin-arm64`.
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = LazybinError;

    /// Parses `os/arch`, `os-arch` or `os_arch`.
    fn from_str(s: &str) -> Result<Self> {
        let (os, arch) = s
            .split_once(['/', '-', '_'])
            .ok_or_else(|| LazybinError::UnsupportedPlatform {
                os: s.to_string(),
                arch: String::new(),
            })?;
        Self::from_host(os, arch)
    }
}

static CACHED_PLATFORM: OnceLock<PlatformId> = OnceLock::new();

/// Resolve the platform of the running host.
///
/// The result only depends on compile-time constants, so a successful
/// resolution is cached for the lifetime of the process.
pub fn resolve() -> Result<PlatformId> {
    if let Some(platform) = CACHED_PLATFORM.get() {
        return Ok(*platform);
    }

    let platform = PlatformId::from_host(std::env::consts::OS, std::env::consts::ARCH)?;
    log::debug!("Resolved host platform: {platform}");
    Ok(*CACHED_PLATFORM.get_or_init(|| platform))
}
