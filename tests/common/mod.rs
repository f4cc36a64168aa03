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

#![allow(dead_code)]

//! Shared helpers: release archives served by a mockito server and commands
//! wired to a scratch `LAZYBIN_HOME`.

use assert_cmd::Command;
use lazybin::config::ReleaseConfig;
use lazybin::platform;
use lazybin::release::{ArchiveFormat, ReleaseDescriptor, locate};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const VERSION: &str = "1.2.0";

/// Descriptor for `version` on this host, rooted at `base_url`.
pub fn host_descriptor(base_url: &str, version: &str) -> ReleaseDescriptor {
    let release = ReleaseConfig {
        base_url: base_url.to_string(),
        ..Default::default()
    };
    locate(version, platform::resolve().unwrap(), &release).unwrap()
}

/// Request path the release for `version` is served from.
pub fn release_path(base_url: &str, version: &str) -> String {
    host_descriptor(base_url, version)
        .url
        .trim_start_matches(base_url)
        .to_string()
}

/// Archive in this host's release format containing `bl` with `script`.
pub fn host_archive(script: &str) -> Vec<u8> {
    let descriptor = host_descriptor("https://example.invalid", VERSION);
    let name = format!("bl-cli_{VERSION}/bl");
    match descriptor.archive_format {
        ArchiveFormat::Zip => zip_with(&name, script.as_bytes()),
        ArchiveFormat::TarGz => tar_gz_with(&name, script.as_bytes()),
    }
}

pub fn tar_gz_with(name: &str, data: &[u8]) -> Vec<u8> {
    let gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(gz);

    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, name, data).unwrap();

    builder.into_inner().unwrap().finish().unwrap()
}

pub fn zip_with(name: &str, data: &[u8]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file(name, SimpleFileOptions::default().unix_permissions(0o755))
        .unwrap();
    zip.write_all(data).unwrap();
    zip.finish().unwrap().into_inner()
}

pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Files left in the staging area.
    pub fn staging_leftovers(&self) -> usize {
        match fs::read_dir(self.path().join("versions").join(".tmp")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub fn installed_dirs(&self) -> Vec<String> {
        match fs::read_dir(self.path().join("versions")) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name != ".tmp")
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// `binary` with this home, the mock release server and a fast retry policy.
    pub fn command(&self, binary: &str, server_url: &str) -> Command {
        let mut cmd = Command::cargo_bin(binary).unwrap();
        cmd.env("LAZYBIN_HOME", self.path())
            .env("LAZYBIN_RELEASE__BASE_URL", server_url)
            .env("LAZYBIN_RELEASE__VERSION", VERSION)
            .env("LAZYBIN_DOWNLOAD__REQUIRE_HTTPS", "false")
            .env("LAZYBIN_DOWNLOAD__INITIAL_BACKOFF_MS", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}
