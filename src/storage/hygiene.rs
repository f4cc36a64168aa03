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

use crate::paths::versions::STAGING_PREFIX;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Staging directories untouched for this long belong to an installer that
/// was killed before its cleanup ran.
pub const STALE_STAGING_AGE: Duration = Duration::from_secs(600);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StagingSweepReport {
    pub removed: usize,
    pub errors: usize,
}

/// Removes abandoned `install-*` directories below the staging root.
#[derive(Debug, Clone)]
pub struct StagingSweeper {
    root: PathBuf,
    age_threshold: Duration,
}

impl StagingSweeper {
    pub fn new(root: PathBuf, age_threshold: Duration) -> Self {
        Self {
            root,
            age_threshold,
        }
    }

    pub fn run(&self) -> StagingSweepReport {
        self.run_with_now(SystemTime::now())
    }

    pub(crate) fn run_with_now(&self, now: SystemTime) -> StagingSweepReport {
        let mut report = StagingSweepReport::default();

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return report,
            Err(err) => {
                warn!("Failed to read staging directory {}: {err}", self.root.display());
                report.errors += 1;
                return report;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !is_install_staging(&path) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_dir() => metadata,
                Ok(_) => continue,
                Err(err) => {
                    warn!("Failed to read metadata for {}: {err}", path.display());
                    report.errors += 1;
                    continue;
                }
            };

            if !is_stale(&metadata, now, self.age_threshold) {
                continue;
            }

            match fs::remove_dir_all(&path) {
                Ok(()) => report.removed += 1,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!("Failed to remove stale staging {}: {err}", path.display());
                    report.errors += 1;
                }
            }
        }

        if report.removed > 0 {
            debug!(
                "Removed {} abandoned staging director(ies) from {}",
                report.removed,
                self.root.display()
            );
        }
        report
    }
}

fn is_install_staging(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(STAGING_PREFIX))
        .unwrap_or(false)
}

fn is_stale(metadata: &fs::Metadata, now: SystemTime, threshold: Duration) -> bool {
    match metadata.modified() {
        Ok(modified) => match now.duration_since(modified) {
            Ok(age) => age >= threshold,
            Err(_) => false,
        },
        Err(_) => false,
    }
}
