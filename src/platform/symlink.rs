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

//! The stable `current` pointer.
//!
//! On Unix the pointer is a symlink; elsewhere it is a small file holding the
//! target path. Either way it is written under a unique temporary name and
//! renamed into place, so readers see the old target or the new one.

use crate::platform::file_ops::atomic_rename;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Point `link` at `target`, replacing any previous pointer atomically.
pub fn replace_pointer(target: &Path, link: &Path) -> io::Result<()> {
    let temp_link = temporary_sibling(link);

    if let Err(e) = create_pointer(target, &temp_link) {
        let _ = fs::remove_file(&temp_link);
        return Err(e);
    }

    atomic_rename(&temp_link, link).inspect_err(|_| {
        let _ = fs::remove_file(&temp_link);
    })
}

/// Read the target of a pointer, `None` when no pointer exists.
pub fn read_pointer(link: &Path) -> io::Result<Option<PathBuf>> {
    match read_pointer_target(link) {
        Ok(target) => Ok(Some(target)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove a pointer if present.
pub fn remove_pointer(link: &Path) -> io::Result<()> {
    match fs::remove_file(link) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn temporary_sibling(link: &Path) -> PathBuf {
    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pointer".to_string());
    link.with_file_name(format!(".{name}.{}", uuid::Uuid::new_v4()))
}

#[cfg(unix)]
fn create_pointer(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(unix)]
fn read_pointer_target(link: &Path) -> io::Result<PathBuf> {
    fs::read_link(link)
}

#[cfg(windows)]
fn create_pointer(target: &Path, link: &Path) -> io::Result<()> {
    fs::write(link, target.to_string_lossy().as_bytes())
}

#[cfg(windows)]
fn read_pointer_target(link: &Path) -> io::Result<PathBuf> {
    Ok(PathBuf::from(fs::read_to_string(link)?.trim()))
}
