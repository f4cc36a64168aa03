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

const LAUNCHER_FILTER: &str = "lazybin=error";

/// Filter directive for the given verbosity (0=warn, 1=info, 2=debug, 3+=trace)
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "lazybin=warn",
        1 => "lazybin=info",
        2 => "lazybin=debug",
        _ => "lazybin=trace",
    }
}

/// Initialize the logger with the specified verbosity level.
///
/// `RUST_LOG` takes precedence over the verbosity flag. Output goes to stderr
/// so it never mixes with a launched tool's stdout.
pub fn setup_logger(verbose: u8) {
    init_with_filter(filter_for_verbosity(verbose));
}

/// Logger for the launcher: errors only unless `RUST_LOG` says otherwise.
pub fn setup_launcher_logger() {
    init_with_filter(LAUNCHER_FILTER);
}

fn init_with_filter(env_filter: &str) {
    // try_init: tests and embedders may have installed a logger already
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(env_filter))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();
}
