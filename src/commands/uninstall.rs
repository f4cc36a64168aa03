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

use crate::config::LazybinConfig;
use crate::error::Result;
use crate::platform;
use crate::release::normalize_version;
use crate::storage::VersionRepository;
use log::info;

pub struct UninstallCommand<'a> {
    config: &'a LazybinConfig,
}

impl<'a> UninstallCommand<'a> {
    pub fn new(config: &'a LazybinConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, version: &str) -> Result<()> {
        let version = normalize_version(version)?;
        let platform = platform::resolve()?;

        let repository = VersionRepository::new(self.config.home().to_path_buf());
        let removed = repository.remove(&version, platform)?;
        info!("Removed {}", removed.display());

        println!(
            "Uninstalled {} {version} ({platform})",
            self.config.release.binary
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LazybinError;
    use tempfile::TempDir;

    #[test]
    fn test_uninstall_missing_version() {
        let temp = TempDir::new().unwrap();
        let config = LazybinConfig::with_home(temp.path().to_path_buf());
        let command = UninstallCommand::new(&config).unwrap();

        assert!(matches!(
            command.execute("v9.9.9"),
            Err(LazybinError::NotInstalled { .. })
        ));
        assert!(matches!(
            command.execute("nine"),
            Err(LazybinError::InvalidVersion(_))
        ));
    }
}
