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
use crate::error::{LazybinError, Result};
use crate::installation::Provisioner;
use crate::storage::CacheEntry;
use serde::Serialize;

#[derive(Serialize)]
struct WhichOutput<'a> {
    version: &'a str,
    platform: String,
    path: String,
    checksum: &'a str,
}

pub struct WhichCommand<'a> {
    config: &'a LazybinConfig,
}

impl<'a> WhichCommand<'a> {
    pub fn new(config: &'a LazybinConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, version: Option<&str>, json: bool) -> Result<()> {
        let entry = self.resolve(version)?;

        if json {
            output_json(&entry)?;
        } else {
            println!("{}", entry.installed_path.display());
        }

        Ok(())
    }

    /// Installed entry for `version`, without installing anything.
    pub fn resolve(&self, version: Option<&str>) -> Result<CacheEntry> {
        let provisioner = Provisioner::new(self.config, CancellationToken::new());
        let descriptor = provisioner.descriptor(version)?;

        provisioner
            .find(&descriptor)?
            .ok_or_else(|| LazybinError::NotInstalled {
                version: descriptor.version.clone(),
                platform: descriptor.platform.to_string(),
            })
    }
}

fn output_json(entry: &CacheEntry) -> Result<()> {
    let output = WhichOutput {
        version: &entry.version,
        platform: entry.platform.to_string(),
        path: entry.installed_path.display().to_string(),
        checksum: &entry.checksum,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
