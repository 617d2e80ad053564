//! Configuration loading, parsing, and validation for avm-check.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use avm_check::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("avm-check.yml"), "workers: 8").unwrap();
//!
//! let config = load_config(None, temp.path()).unwrap();
//! assert_eq!(config.workers, 8);
//! assert_eq!(config.tracked_providers["azurerm"], "4.0.0");
//! ```
//!
//! # Configuration File Location
//!
//! `--config <path>` if given, otherwise `avm-check.yml` in the working
//! directory, otherwise built-in defaults. Command-line flags override
//! values from the file.

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{find_config, load_config, load_config_file, parse_config};
pub use schema::{CheckConfig, RetrySettings, DEFAULT_CONFIG_FILE, DEFAULT_SOURCE_URL};
pub use validator::{validate, validate_config, ValidationError};
