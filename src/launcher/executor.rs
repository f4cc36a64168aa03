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

//! Runs the installed executable as a child process.
//!
//! The child inherits stdio and the environment. On Unix the launcher stays
//! alive as the parent, relays termination signals sent to it by other
//! processes, and mirrors the child's exit status.

use crate::error::{LazybinError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Spawn `executable` with `args`, wait for it, and return its exit code.
pub fn run_to_completion(executable: &Path, args: &[OsString]) -> Result<i32> {
    // Registered before the spawn so nothing sent in between is lost
    let pending = forwarding::PendingSignals::register();

    let mut child = Command::new(executable)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| LazybinError::LaunchFailure {
            path: executable.display().to_string(),
            reason: e.to_string(),
        })?;

    let forwarder = pending.and_then(|signals| signals.forward_to(child.id()));
    let status = child.wait();
    drop(forwarder);

    let status = status.map_err(|e| LazybinError::LaunchFailure {
        path: executable.display().to_string(),
        reason: format!("failed to wait for process: {e}"),
    })?;

    Ok(exit_code(status))
}

/// Exit code to report for a finished child; death by signal `n` is `128 + n`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(unix)]
mod forwarding {
    use log::{debug, warn};
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::iterator::exfiltrator::WithOrigin;
    use signal_hook::iterator::{Handle, SignalsInfo};
    use signal_hook::low_level::siginfo::Cause;
    use std::thread::{self, JoinHandle};

    const FORWARDED: [i32; 4] = [SIGINT, SIGTERM, SIGHUP, SIGQUIT];

    /// Signals caught before the child exists, relayed once it does.
    pub struct PendingSignals(SignalsInfo<WithOrigin>);

    impl PendingSignals {
        pub fn register() -> Option<Self> {
            match SignalsInfo::<WithOrigin>::new(FORWARDED) {
                Ok(signals) => Some(Self(signals)),
                Err(e) => {
                    warn!("Failed to install signal forwarding: {e}");
                    None
                }
            }
        }

        pub fn forward_to(self, child_id: u32) -> Option<SignalForwarder> {
            let Ok(raw_pid) = i32::try_from(child_id) else {
                warn!("Child pid {child_id} out of range, signals will not be forwarded");
                return None;
            };
            let pid = Pid::from_raw(raw_pid);

            let mut signals = self.0;
            let handle = signals.handle();

            let thread = thread::spawn(move || {
                for origin in signals.forever() {
                    let sender = origin.process.map(|process| process.pid);
                    if !needs_relay(origin.cause, sender) {
                        debug!("Child {pid} already received signal {}", origin.signal);
                        continue;
                    }
                    let Ok(signal) = Signal::try_from(origin.signal) else {
                        continue;
                    };
                    debug!("Forwarding {signal} to child {pid}");
                    if let Err(e) = kill(pid, signal) {
                        debug!("Failed to forward {signal}: {e}");
                    }
                }
            });

            Some(SignalForwarder {
                handle,
                thread: Some(thread),
            })
        }
    }

    /// Keyboard and hangup signals come from the kernel and reach the whole
    /// foreground process group, child included. Only signals another
    /// process sent to the launcher itself are relayed.
    pub(super) fn needs_relay(cause: Cause, sender: Option<i32>) -> bool {
        !matches!(cause, Cause::Kernel) && sender.is_some_and(|pid| pid > 0)
    }

    /// Relays signals received by the launcher to the child until dropped.
    pub struct SignalForwarder {
        handle: Handle,
        thread: Option<JoinHandle<()>>,
    }

    impl Drop for SignalForwarder {
        fn drop(&mut self) {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

#[cfg(not(unix))]
mod forwarding {
    /// Console control events reach every process in the group already.
    pub struct PendingSignals;

    pub struct SignalForwarder;

    impl PendingSignals {
        pub fn register() -> Option<Self> {
            Some(Self)
        }

        pub fn forward_to(self, _child_id: u32) -> Option<SignalForwarder> {
            Some(SignalForwarder)
        }
    }
}
