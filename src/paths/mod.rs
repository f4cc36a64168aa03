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

//! Filesystem layout of the installation home.
//!
//! ```text
//! $LAZYBIN_HOME/
//!   config.toml
//!   current -> versions/1.2.0-linux-amd64
//!   versions/
//!     .tmp/                     staging for in-flight installs
//!     1.2.0-linux-amd64/
//!       bl
//!       install.json
//! ```

pub mod home;
pub mod versions;

pub use home::DEFAULT_HOME_DIR_NAME;
