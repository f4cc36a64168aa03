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

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Receives byte counts while a release archive streams in.
pub trait ProgressReporter: Send {
    /// `total_bytes` is zero when the server did not declare a length.
    fn on_start(&mut self, total_bytes: u64);
    fn on_progress(&mut self, bytes_downloaded: u64);
    fn on_complete(&mut self);
}

/// Terminal progress bar on stderr. Only the management CLI uses it; the
/// launcher never draws anything of its own.
pub struct IndicatifProgressReporter {
    label: String,
    progress_bar: Option<ProgressBar>,
}

impl IndicatifProgressReporter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            progress_bar: None,
        }
    }

    fn template(total_bytes: u64) -> &'static str {
        if total_bytes > 0 {
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
             {bytes}/{total_bytes} {msg} ({bytes_per_sec}, {eta})"
        } else {
            "{spinner:.green} [{elapsed_precise}] {bytes} {msg}"
        }
    }
}

impl ProgressReporter for IndicatifProgressReporter {
    fn on_start(&mut self, total_bytes: u64) {
        let pb = if total_bytes > 0 {
            ProgressBar::with_draw_target(Some(total_bytes), ProgressDrawTarget::stderr())
        } else {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
        };

        match ProgressStyle::default_bar().template(Self::template(total_bytes)) {
            Ok(style) => pb.set_style(style.progress_chars("█▓░").tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷")),
            Err(e) => log::debug!("Falling back to default progress style: {e}"),
        }

        pb.set_message(format!("Downloading {}", self.label));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    fn on_progress(&mut self, bytes_downloaded: u64) {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(bytes_downloaded);
        }
    }

    fn on_complete(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_with_message(format!("Downloaded {}", self.label));
        }
    }
}

impl Drop for IndicatifProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.abandon();
        }
    }
}
