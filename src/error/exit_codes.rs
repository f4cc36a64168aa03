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

use crate::error::LazybinError;

/// Exit code reserved for "the executable could not be started at all".
///
/// Scripts calling the launcher can tell this apart from codes the child
/// returns itself, following the shell convention for "command not found".
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

pub fn get_exit_code(error: &LazybinError) -> i32 {
    match error {
        LazybinError::InvalidVersion(_) | LazybinError::InvalidConfig(_) => 2,

        LazybinError::UnsupportedPlatform { .. } => 3,

        LazybinError::NotInstalled { .. } => 4,

        LazybinError::SecurityError(_) => 13,

        LazybinError::NetworkError(_) => 20,
        LazybinError::DownloadFailed { .. } => 21,
        LazybinError::RedirectLoop { .. } => 22,
        LazybinError::DownloadTooLarge { .. } => 23,

        LazybinError::ArchiveCorrupt(_) => 30,
        LazybinError::ExtractionFailed(_) => 31,
        LazybinError::ChecksumMismatch { .. } => 32,

        LazybinError::LaunchFailure { .. } => LAUNCH_FAILURE_EXIT_CODE,

        LazybinError::Cancelled => 130, // 128 + SIGINT

        _ => 1,
    }
}
