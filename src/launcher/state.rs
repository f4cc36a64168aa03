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

use std::fmt;

/// Lifecycle of one launcher invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchState {
    NotInstalled,
    Installing,
    Installed,
    Running,
    Exited(i32),
    InstallFailed(String),
}

impl LaunchState {
    pub fn can_transition_to(&self, next: &LaunchState) -> bool {
        use LaunchState::*;

        matches!(
            (self, next),
            (NotInstalled, Installing)
                | (NotInstalled, Installed)
                | (NotInstalled, InstallFailed(_))
                | (Installing, Installed)
                | (Installing, NotInstalled)
                | (Installed, Running)
                | (Running, Exited(_))
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchState::Exited(_) | LaunchState::InstallFailed(_))
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchState::NotInstalled => write!(f, "not-installed"),
            LaunchState::Installing => write!(f, "installing"),
            LaunchState::Installed => write!(f, "installed"),
            LaunchState::Running => write!(f, "running"),
            LaunchState::Exited(code) => write!(f, "exited({code})"),
            LaunchState::InstallFailed(reason) => write!(f, "install-failed({reason})"),
        }
    }
}
