//! Configuration schema definitions for avm-check.
//!
//! This module contains the struct definitions that map to the
//! `avm-check.yml` file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::scan::RetryPolicy;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "avm-check.yml";

/// Module index of the Azure Verified Modules Terraform resource modules.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/Azure/Azure-Verified-Modules/refs/heads/main/docs/static/module-indexes/TerraformResourceModules.csv";

/// Root configuration structure for avm-check.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Provider name -> minimum version every module must admit
    pub tracked_providers: BTreeMap<String, String>,

    /// Concurrent repository workers
    pub workers: usize,

    /// Clone retry settings
    pub retry: RetrySettings,

    /// Per-attempt clone deadline; 0 disables it
    pub clone_timeout_secs: u64,

    /// Months without a commit before a repository counts as dormant
    pub dormant_after_months: u32,

    /// Where `update-source` and `process --download` fetch the module index
    pub source_url: String,

    /// Parent directory for scratch clones (system temp dir if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            tracked_providers: default_tracked_providers(),
            workers: 5,
            retry: RetrySettings::default(),
            clone_timeout_secs: 600,
            dormant_after_months: 6,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            scratch_dir: None,
        }
    }
}

fn default_tracked_providers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("azurerm".to_string(), "4.0.0".to_string()),
        ("azapi".to_string(), "2.0.0".to_string()),
    ])
}

impl CheckConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry.attempts,
            delay: Duration::from_secs(self.retry.delay_secs),
        }
    }

    pub fn clone_timeout(&self) -> Option<Duration> {
        (self.clone_timeout_secs > 0).then(|| Duration::from_secs(self.clone_timeout_secs))
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Retry settings for clones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first
    pub attempts: u32,

    /// Seconds to wait between attempts
    pub delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 2,
        }
    }
}
