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

//! Fetches release archives over HTTP(S).
//!
//! Redirects are followed by hand with a hop limit, bodies are buffered in
//! memory up to a size cap, and transport errors are retried with backoff.

mod client;
mod fetcher;
mod options;
mod progress;

pub use client::{AttohttpcClient, DEFAULT_TIMEOUT, HttpClient, HttpResponse};
pub use fetcher::Fetcher;
pub use options::FetchOptions;
pub use progress::{IndicatifProgressReporter, ProgressReporter};
