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
use crate::storage::{CacheEntry, VersionRepository};
use log::debug;
use std::path::Path;

pub struct ListCommand<'a> {
    config: &'a LazybinConfig,
}

impl<'a> ListCommand<'a> {
    pub fn new(config: &'a LazybinConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<()> {
        let repository = VersionRepository::new(self.config.home().to_path_buf());
        let entries = repository.list()?;

        if entries.is_empty() {
            println!("No versions installed");
            println!("Use 'lazybin install [VERSION]' to install one");
            return Ok(());
        }

        let current = repository.current()?;
        debug!("Current entry: {current:?}");

        println!("Installed versions:");
        for entry in &entries {
            println!("{}", format_entry(entry, current.as_deref()));
        }

        Ok(())
    }
}

/// One listing line, e.g. `* 1.2.0 (linux/amd64) installed 2025-01-02 03:04`.
fn format_entry(entry: &CacheEntry, current: Option<&Path>) -> String {
    let marker = if current.is_some() && entry.entry_dir() == current {
        "*"
    } else {
        " "
    };

    format!(
        "{marker} {} ({}) installed {}",
        entry.version,
        entry.platform,
        entry.installed_at.format("%Y-%m-%d %H:%M")
    )
}
