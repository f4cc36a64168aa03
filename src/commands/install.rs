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
use crate::error::Result;
use crate::installation::Provisioner;
use log::{debug, info};

pub struct InstallCommand<'a> {
    config: &'a LazybinConfig,
    cancellation: CancellationToken,
}

impl<'a> InstallCommand<'a> {
    pub fn new(config: &'a LazybinConfig, cancellation: CancellationToken) -> Result<Self> {
        Ok(Self {
            config,
            cancellation,
        })
    }

    /// Install `version` (or the configured version) and make it current.
    pub fn execute(&self, version: Option<&str>, force: bool, no_progress: bool) -> Result<()> {
        let provisioner = Provisioner::new(self.config, self.cancellation.clone())
            .with_progress(!no_progress);
        let descriptor = provisioner.descriptor(version)?;
        debug!("Install options: force={force}, no_progress={no_progress}");

        let existing = provisioner.find(&descriptor)?;
        if let Some(existing) = &existing {
            if !force {
                provisioner.repository().activate(existing)?;
                println!(
                    "{} {} is already installed at {}",
                    self.config.release.binary,
                    existing.version,
                    existing.installed_path.display()
                );
                return Ok(());
            }
            info!("Reinstalling {} {}", existing.version, existing.platform);
        }

        println!(
            "Installing {} {} for {}...",
            self.config.release.binary, descriptor.version, descriptor.platform
        );
        // The current entry stays in place until the new copy is verified
        let entry = if existing.is_some() {
            provisioner.reinstall(&descriptor)?
        } else {
            provisioner.install(&descriptor)?
        };

        println!(
            "Installed {} {} at {}",
            self.config.release.binary,
            entry.version,
            entry.installed_path.display()
        );
        println!("Checksum (sha256): {}", entry.checksum);
        Ok(())
    }
}
