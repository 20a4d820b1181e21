//! Error types and handling for Podgen
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Variants are grouped by domain:
//! - Installation errors: fatal conditions hit while producing build units
//! - Manifest errors: loading and validating the install manifest
//! - File system errors: reading, writing and linking generated files

#![allow(dead_code)]

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Podgen operations
#[derive(Error, Diagnostic, Debug)]
pub enum PodgenError {
    // Installation errors
    #[error("Unable to find {kind} ref for {path} for target {target}.")]
    #[diagnostic(
        code(podgen::install::missing_reference),
        help(
            "Check that the file exists on disk and was registered with the project. Dangling symlinks are a common cause."
        )
    )]
    MissingFileReference {
        kind: String,
        path: String,
        target: String,
    },

    #[error(
        "Unable to install the `{pod}` pod, because the `{unit}` target in Xcode would have no sources to compile."
    )]
    #[diagnostic(code(podgen::install::empty_unit))]
    NoSourcesToCompile { pod: String, unit: String },

    #[error(
        "Using Swift static libraries with custom module maps is currently not supported. Please build `{pod}` as a framework or remove the custom module map."
    )]
    #[diagnostic(code(podgen::install::unsupported_configuration))]
    SwiftStaticLibraryWithCustomModuleMap { pod: String },

    // Manifest errors
    #[error("Manifest file not found: {path}")]
    #[diagnostic(code(podgen::manifest::not_found))]
    ManifestNotFound { path: String },

    #[error("Failed to parse manifest file: {path}")]
    #[diagnostic(code(podgen::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid manifest: {message}")]
    #[diagnostic(code(podgen::manifest::invalid))]
    ManifestInvalid { message: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    #[diagnostic(
        code(podgen::manifest::invalid_glob),
        help("Bundle file lists accept literal paths and glob patterns like 'Assets/**/*.png'")
    )]
    InvalidGlobPattern { pattern: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(podgen::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(podgen::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to create symlink at {path}")]
    #[diagnostic(code(podgen::fs::symlink_failed))]
    SymlinkFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(podgen::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for PodgenError {
    fn from(err: std::io::Error) -> Self {
        PodgenError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for PodgenError {
    fn from(err: serde_yaml::Error) -> Self {
        PodgenError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PodgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_missing_reference_display() {
        let err = PodgenError::MissingFileReference {
            kind: "source".to_string(),
            path: "/pods/Banana/Classes/Banana.m".to_string(),
            target: "BananaLib".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to find source ref for /pods/Banana/Classes/Banana.m for target BananaLib."
        );
    }

    #[test]
    fn test_empty_unit_display() {
        let err = PodgenError::NoSourcesToCompile {
            pod: "BananaLib".to_string(),
            unit: "BananaLib-Unit-Tests".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to install the `BananaLib` pod, because the `BananaLib-Unit-Tests` target in Xcode would have no sources to compile."
        );
    }

    #[test]
    fn test_error_code() {
        let err = PodgenError::NoSourcesToCompile {
            pod: "BananaLib".to_string(),
            unit: "BananaLib".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("podgen::install::empty_unit".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let podgen_err: PodgenError = io_err.into();
        assert!(matches!(podgen_err, PodgenError::IoError { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: yaml: content: [unclosed";
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str(yaml_str);
        let yaml_err = parse_result.unwrap_err();
        let podgen_err: PodgenError = yaml_err.into();
        assert!(matches!(podgen_err, PodgenError::ManifestParseFailed { .. }));
    }

    test_error_contains!(
        test_swift_static_library_error,
        PodgenError::SwiftStaticLibraryWithCustomModuleMap {
            pod: "CoconutLib".to_string(),
        },
        "Using Swift static libraries with custom module maps is currently not supported",
        "`CoconutLib`",
    );

    test_error_contains!(
        test_manifest_not_found_error,
        PodgenError::ManifestNotFound {
            path: "/tmp/podgen.yaml".to_string(),
        },
        "Manifest file not found",
    );

    test_error_contains!(
        test_symlink_failed_error,
        PodgenError::SymlinkFailed {
            path: "Headers/Public/Foo/Foo.modulemap".to_string(),
            reason: "permission denied".to_string(),
        },
        "Failed to create symlink",
    );
}
