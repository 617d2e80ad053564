//! Error types for avm-check operations.
//!
//! This module defines [`CheckError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `CheckError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `CheckError::Other`) for unexpected errors
//! - Failures while scanning a single repository never surface here; the
//!   pipeline records them on the repository's [`Outcome`](crate::scan::Outcome)

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for avm-check operations.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A version string could not be parsed.
    #[error("failed to parse version '{input}': {message}")]
    InvalidVersion { input: String, message: String },

    /// A constraint expression could not be parsed.
    #[error("failed to parse constraint '{input}': {message}")]
    InvalidConstraint { input: String, message: String },

    /// A Terraform module could not be loaded.
    #[error("failed to load module at {path}: {message}")]
    ModuleLoad { path: PathBuf, message: String },

    /// The module index could not be read or fetched.
    #[error("Module source error: {message}")]
    Source { message: String },

    /// A report file could not be read or written.
    #[error("Report error at {path}: {message}")]
    Report { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for avm-check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = CheckError::ConfigNotFound {
            path: PathBuf::from("/foo/avm-check.yml"),
        };
        assert!(err.to_string().contains("/foo/avm-check.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = CheckError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn invalid_version_displays_input() {
        let err = CheckError::InvalidVersion {
            input: "four".into(),
            message: "malformed version".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse version 'four': malformed version"
        );
    }

    #[test]
    fn invalid_constraint_displays_input() {
        let err = CheckError::InvalidConstraint {
            input: "not-a-version".into(),
            message: "malformed constraint".into(),
        };
        assert!(err.to_string().contains("'not-a-version'"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CheckError = io_err.into();
        assert!(matches!(err, CheckError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(CheckError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
