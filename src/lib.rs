//! avm-check - Provider version compliance for Azure Verified Modules.
//!
//! avm-check reads the module index CSV, shallow-clones every Terraform
//! module repository, extracts its `required_providers` constraints and
//! checks whether they admit the configured provider floors. The results
//! are written as a JSON report and summarized as unreachable, non-compliant
//! and dormant repositories.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`report`] - JSON report reading and writing
//! - [`scan`] - Cloning, extraction, constraint evaluation and dispatch
//! - [`source`] - Module index download and parsing
//! - [`ui`] - Terminal output, progress bars and themes
//!
//! # Example
//!
//! ```
//! use avm_check::scan::satisfies;
//!
//! assert!(satisfies("4.0.0", ">= 3.116, < 5.0").unwrap());
//! assert!(!satisfies("4.0.0", "~> 3.0").unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod scan;
pub mod source;
pub mod ui;

pub use error::{CheckError, Result};
