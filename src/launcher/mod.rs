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

//! The `bl` entry point: make sure the configured release is installed,
//! then run it with the caller's arguments.

pub mod executor;
mod state;

pub use state::LaunchState;

use crate::cancellation::{CancellationToken, global_token};
use crate::config::{LazybinConfig, new_lazybin_config};
use crate::error::{LazybinError, Result, format_error_chain, get_exit_code};
use crate::installation::Provisioner;
use crate::storage::CacheEntry;
use log::debug;
use std::ffi::OsString;
use std::process;

pub struct Launcher {
    config: LazybinConfig,
    cancellation: CancellationToken,
    state: LaunchState,
}

impl Launcher {
    pub fn new(config: LazybinConfig, cancellation: CancellationToken) -> Self {
        Self {
            config,
            cancellation,
            state: LaunchState::NotInstalled,
        }
    }

    pub fn state(&self) -> &LaunchState {
        &self.state
    }

    fn transition(&mut self, next: LaunchState) {
        advance(&mut self.state, next);
    }

    /// Installed entry for the configured version, provisioning it if needed.
    pub fn ensure_installed(&mut self) -> Result<CacheEntry> {
        let Self {
            config,
            cancellation,
            state,
        } = self;
        let provisioner = Provisioner::new(config, cancellation.clone());
        let descriptor = provisioner.descriptor(None)?;

        if let Some(entry) = provisioner.find(&descriptor)? {
            advance(state, LaunchState::Installed);
            return Ok(entry);
        }

        advance(state, LaunchState::Installing);
        match provisioner.install(&descriptor) {
            Ok(entry) => {
                advance(state, LaunchState::Installed);
                Ok(entry)
            }
            Err(e) => {
                // Transport retries already happened inside the fetcher.
                advance(state, LaunchState::NotInstalled);
                advance(state, LaunchState::InstallFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Run the executable with `args` and return the code to exit with.
    pub fn run(&mut self, args: Vec<OsString>) -> Result<i32> {
        let entry = self.ensure_installed()?;

        self.transition(LaunchState::Running);
        let code = executor::run_to_completion(&entry.installed_path, &args)?;
        self.transition(LaunchState::Exited(code));

        Ok(code)
    }
}

fn advance(state: &mut LaunchState, next: LaunchState) {
    if !state.can_transition_to(&next) {
        debug!("Unexpected launch state change {state} -> {next}");
    }
    debug!("Launch state: {state} -> {next}");
    *state = next;
}

/// Provision and run the configured release, then exit with its status.
pub fn launch(args: Vec<OsString>) -> ! {
    let result =
        new_lazybin_config().and_then(|config| Launcher::new(config, global_token()).run(args));

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            report(&e);
            process::exit(get_exit_code(&e));
        }
    }
}

fn report(error: &LazybinError) {
    match error {
        LazybinError::LaunchFailure { .. } => eprintln!("bl: {error}"),
        _ => eprintln!("{}", format_error_chain(error)),
    }
}
