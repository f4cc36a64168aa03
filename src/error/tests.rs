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

use crate::error::format::format_error_with_color;
use crate::error::*;

#[test]
fn test_error_context_unsupported_platform() {
    let error = LazybinError::UnsupportedPlatform {
        os: "freebsd".to_string(),
        arch: "riscv64".to_string(),
    };
    let context = ErrorContext::new(&error);

    assert!(context.suggestion.is_some());
    let details = context.details.unwrap();
    assert!(details.contains("freebsd"));
    assert!(details.contains("riscv64"));
    assert!(error.to_string().contains("freebsd"));
}

#[test]
fn test_error_context_download_failed_not_found() {
    let error = LazybinError::DownloadFailed {
        url: "https://example.com/bl.tar.gz".to_string(),
        status_code: 404,
    };
    let context = ErrorContext::new(&error);

    assert!(context.suggestion.unwrap().contains("not found"));
    assert!(context.details.unwrap().contains("404"));
}

#[test]
fn test_error_context_names_install_step() {
    let error = LazybinError::ChecksumMismatch {
        expected: "aa".to_string(),
        actual: "bb".to_string(),
    };
    let details = ErrorContext::new(&error).details.unwrap();
    assert!(details.contains("verification"));
    assert!(details.contains("aa"));
    assert!(details.contains("bb"));

    let error = LazybinError::ArchiveCorrupt("missing entry".to_string());
    assert!(
        ErrorContext::new(&error)
            .details
            .unwrap()
            .contains("reading the archive")
    );
}

#[test]
fn test_launch_failure_is_distinguished_from_install_failure() {
    let launch = LazybinError::LaunchFailure {
        path: "/tmp/bl".to_string(),
        reason: "permission denied".to_string(),
    };
    let install = LazybinError::ExtractionFailed("disk full".to_string());

    let launch_suggestion = ErrorContext::new(&launch).suggestion.unwrap();
    let install_suggestion = ErrorContext::new(&install).suggestion.unwrap();

    assert!(launch_suggestion.contains("installation is intact"));
    assert!(!install_suggestion.contains("installation is intact"));
}

#[test]
fn test_error_context_with_custom_suggestion() {
    let error = LazybinError::NetworkError("reset".to_string());
    let context =
        ErrorContext::new(&error).with_suggestion("Try using a different mirror.".to_string());

    assert_eq!(
        context.suggestion,
        Some("Try using a different mirror.".to_string())
    );
}

#[test]
fn test_error_context_display() {
    let error = LazybinError::ChecksumMismatch {
        expected: "aa".to_string(),
        actual: "bb".to_string(),
    };
    let output = ErrorContext::new(&error).to_string();

    assert!(output.contains("Error:"));
    assert!(output.contains("Details:"));
    assert!(output.contains("Suggestion:"));
}

#[test]
fn test_exit_codes() {
    assert_eq!(
        get_exit_code(&LazybinError::InvalidVersion("x".to_string())),
        2
    );
    assert_eq!(
        get_exit_code(&LazybinError::UnsupportedPlatform {
            os: "a".to_string(),
            arch: "b".to_string()
        }),
        3
    );
    assert_eq!(
        get_exit_code(&LazybinError::NetworkError("test".to_string())),
        20
    );
    assert_eq!(
        get_exit_code(&LazybinError::DownloadFailed {
            url: String::new(),
            status_code: 404
        }),
        21
    );
    assert_eq!(
        get_exit_code(&LazybinError::RedirectLoop {
            url: String::new(),
            hops: 11
        }),
        22
    );
    assert_eq!(
        get_exit_code(&LazybinError::ArchiveCorrupt("x".to_string())),
        30
    );
    assert_eq!(
        get_exit_code(&LazybinError::LaunchFailure {
            path: String::new(),
            reason: String::new()
        }),
        LAUNCH_FAILURE_EXIT_CODE
    );
    assert_eq!(get_exit_code(&LazybinError::Cancelled), 130);
    assert_eq!(
        get_exit_code(&LazybinError::ConfigError("test".to_string())),
        1
    );
}

#[test]
fn test_only_network_errors_are_retryable() {
    assert!(LazybinError::NetworkError("reset".to_string()).is_retryable());
    assert!(
        !LazybinError::DownloadFailed {
            url: String::new(),
            status_code: 503
        }
        .is_retryable()
    );
    assert!(
        !LazybinError::RedirectLoop {
            url: String::new(),
            hops: 3
        }
        .is_retryable()
    );
}

#[test]
fn test_io_error_permission_denied() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
    let error = LazybinError::Io(io_err);
    let context = ErrorContext::new(&error);

    assert!(context.suggestion.is_some());
}

#[test]
fn test_format_error_chain() {
    let error = LazybinError::InvalidVersion("latest".to_string());
    let formatted = format_error_chain(&error);

    assert!(formatted.contains("Error:"));
    assert!(formatted.contains("Invalid version"));
}

#[test]
fn test_format_error_with_color_reset() {
    let error = LazybinError::DownloadFailed {
        url: "https://example.com/a".to_string(),
        status_code: 404,
    };

    let formatted = format_error_with_color(&error, true);
    assert!(formatted.ends_with("\x1b[0m"));
    assert!(formatted.contains("Error:"));

    let plain = format_error_with_color(&error, false);
    assert!(!plain.contains("\x1b["));
    assert!(plain.contains("Suggestions:"));
}
