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

//! Pulls the one executable a release archive ships out of a zip or tar.gz.

use crate::error::{LazybinError, Result};
use crate::release::ArchiveFormat;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::Archive as TarArchive;
use zip::ZipArchive;

const CHUNK_SIZE: usize = 64 * 1024;

/// Extract the entry named `entry_name` from `archive_path` into `destination`.
///
/// The entry may sit in any directory of the archive; the first regular file
/// whose file name matches wins. Returns the number of bytes written.
pub fn extract_single(
    archive_path: &Path,
    format: ArchiveFormat,
    entry_name: &str,
    destination: &Path,
) -> Result<u64> {
    let written = match format {
        ArchiveFormat::TarGz => extract_from_tar_gz(archive_path, entry_name, destination)?,
        ArchiveFormat::Zip => extract_from_zip(archive_path, entry_name, destination)?,
    };

    written.ok_or_else(|| {
        LazybinError::ArchiveCorrupt(format!(
            "{} archive does not contain '{entry_name}'",
            format.extension()
        ))
    })
}

fn extract_from_tar_gz(
    archive_path: &Path,
    entry_name: &str,
    destination: &Path,
) -> Result<Option<u64>> {
    let file = File::open(archive_path)?;
    let gz = flate2::read::GzDecoder::new(file);
    let mut archive = TarArchive::new(gz);

    let entries = archive.entries().map_err(corrupt("tar.gz"))?;

    for entry in entries {
        let mut entry = entry.map_err(corrupt("tar.gz"))?;
        let path = entry.path().map_err(corrupt("tar.gz"))?.into_owned();

        if !entry.header().entry_type().is_file() || !is_safe_entry_path(&path) {
            continue;
        }

        if matches_entry_name(&path, entry_name) {
            log::debug!("Extracting {path:?} from tar.gz archive");
            return copy_entry(&mut entry, destination).map(Some);
        }
    }

    Ok(None)
}

fn extract_from_zip(
    archive_path: &Path,
    entry_name: &str,
    destination: &Path,
) -> Result<Option<u64>> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(corrupt("zip"))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(corrupt("zip"))?;

        let Some(path) = file.enclosed_name() else {
            log::warn!("Skipping zip entry with unsafe name: {}", file.name());
            continue;
        };

        if !file.is_file() || !is_safe_entry_path(&path) {
            continue;
        }

        if matches_entry_name(&path, entry_name) {
            log::debug!("Extracting {path:?} from zip archive");
            return copy_entry(&mut file, destination).map(Some);
        }
    }

    Ok(None)
}

/// Copy an entry's data, telling archive read errors apart from write errors.
fn copy_entry<R: Read>(reader: &mut R, destination: &Path) -> Result<u64> {
    let mut output = File::create(destination).map_err(extraction_failed(destination))?;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(LazybinError::ArchiveCorrupt(format!(
                    "Failed to read archive entry: {e}"
                )));
            }
        };
        output
            .write_all(&buffer[..n])
            .map_err(extraction_failed(destination))?;
        total += n as u64;
    }

    output.sync_all().map_err(extraction_failed(destination))?;
    Ok(total)
}

fn matches_entry_name(path: &Path, entry_name: &str) -> bool {
    path.file_name() == Some(OsStr::new(entry_name))
}

/// Entries that are absolute or climb out with `..` are never written.
fn is_safe_entry_path(entry_path: &Path) -> bool {
    let mut depth = 0usize;

    for component in entry_path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    log::warn!("Skipping archive entry with path traversal: {entry_path:?}");
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                log::warn!("Skipping archive entry with absolute path: {entry_path:?}");
                return false;
            }
        }
    }

    depth > 0
}

fn corrupt<E: std::fmt::Display>(kind: &'static str) -> impl Fn(E) -> LazybinError {
    move |e| LazybinError::ArchiveCorrupt(format!("Invalid {kind} archive: {e}"))
}

fn extraction_failed(destination: &Path) -> impl Fn(io::Error) -> LazybinError {
    let destination: PathBuf = destination.to_path_buf();
    move |e| LazybinError::ExtractionFailed(format!("{}: {e}", destination.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};
    use zip::write::SimpleFileOptions;

    struct TestArchive {
        path: PathBuf,
        _temp_dir: TempDir,
    }

    fn create_tar_gz(entries: &[(&str, &[u8])]) -> TestArchive {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("release.tar.gz");

        let file = File::create(&path).unwrap();
        let gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(gz);

        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();

        TestArchive {
            path,
            _temp_dir: temp_dir,
        }
    }

    fn create_zip(entries: &[(&str, &[u8])]) -> TestArchive {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("release.zip");

        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o755);

        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();

        TestArchive {
            path,
            _temp_dir: temp_dir,
        }
    }

    #[test]
    fn test_extract_from_tar_gz() -> Result<()> {
        let archive = create_tar_gz(&[
            ("README.md", b"docs".as_slice()),
            ("bl-cli_1.0.0_linux_amd64/bl", b"#!/bin/sh\necho hi\n".as_slice()),
        ]);
        let dest = tempdir()?;
        let target = dest.path().join("bl");

        let written = extract_single(&archive.path, ArchiveFormat::TarGz, "bl", &target)?;

        assert_eq!(written, 18);
        assert_eq!(fs::read(&target)?, b"#!/bin/sh\necho hi\n");
        Ok(())
    }

    #[test]
    fn test_extract_from_zip() -> Result<()> {
        let archive = create_zip(&[("LICENSE", b"MIT".as_slice()), ("bl", b"binary".as_slice())]);
        let dest = tempdir()?;
        let target = dest.path().join("bl");

        extract_single(&archive.path, ArchiveFormat::Zip, "bl", &target)?;

        assert_eq!(fs::read(&target)?, b"binary");
        Ok(())
    }

    #[test]
    fn test_name_must_match_exactly() {
        let archive = create_zip(&[("bl.sig", b"sig".as_slice()), ("blx", b"other".as_slice())]);
        let dest = tempdir().unwrap();

        let result = extract_single(
            &archive.path,
            ArchiveFormat::Zip,
            "bl",
            &dest.path().join("bl"),
        );

        assert!(matches!(result, Err(LazybinError::ArchiveCorrupt(_))));
        assert!(!dest.path().join("bl").exists());
    }

    #[test]
    fn test_garbage_is_corrupt() -> Result<()> {
        let dest = tempdir()?;
        let garbage = dest.path().join("garbage");
        fs::write(&garbage, b"this is not an archive at all")?;

        for format in [ArchiveFormat::Zip, ArchiveFormat::TarGz] {
            let result = extract_single(&garbage, format, "bl", &dest.path().join("bl"));
            assert!(
                matches!(result, Err(LazybinError::ArchiveCorrupt(_))),
                "{format}: {result:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_truncated_tar_gz_is_corrupt() -> Result<()> {
        let archive = create_tar_gz(&[("bl", vec![42u8; 100_000].as_slice())]);
        let bytes = fs::read(&archive.path)?;
        let dest = tempdir()?;
        let truncated = dest.path().join("truncated.tar.gz");
        fs::write(&truncated, &bytes[..bytes.len() / 2])?;

        let result = extract_single(
            &truncated,
            ArchiveFormat::TarGz,
            "bl",
            &dest.path().join("bl"),
        );

        assert!(matches!(result, Err(LazybinError::ArchiveCorrupt(_))));
        Ok(())
    }

    #[test]
    fn test_unwritable_destination_is_extraction_failure() {
        let archive = create_zip(&[("bl", b"binary".as_slice())]);
        let dest = tempdir().unwrap();
        let target = dest.path().join("missing-dir").join("bl");

        let result = extract_single(&archive.path, ArchiveFormat::Zip, "bl", &target);

        assert!(matches!(result, Err(LazybinError::ExtractionFailed(_))));
    }

    #[test]
    fn test_is_safe_entry_path() {
        assert!(is_safe_entry_path(Path::new("bl")));
        assert!(is_safe_entry_path(Path::new("dist/bin/bl")));
        assert!(is_safe_entry_path(Path::new("./dist/../bl")));

        assert!(!is_safe_entry_path(Path::new("../bl")));
        assert!(!is_safe_entry_path(Path::new("dist/../../bl")));
        assert!(!is_safe_entry_path(Path::new("/usr/local/bin/bl")));
        assert!(!is_safe_entry_path(Path::new(".")));
    }
}
