//! Configuration file discovery and loading.

use crate::config::schema::{CheckConfig, DEFAULT_CONFIG_FILE};
use crate::config::validator::validate;
use crate::error::{CheckError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Find the config file to use.
///
/// An explicit path is returned as is. Otherwise `avm-check.yml` in
/// `working_dir` is used if it exists.
pub fn find_config(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let path = working_dir.join(DEFAULT_CONFIG_FILE);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load, parse and validate the configuration.
///
/// Falls back to defaults when no file is found. An explicit path that
/// doesn't exist is an error.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<CheckConfig> {
    let config = match find_config(explicit, working_dir) {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            load_config_file(&path)?
        }
        None => {
            tracing::debug!("No configuration file found, using defaults");
            CheckConfig::default()
        }
    };
    validate(&config)?;
    Ok(config)
}

/// Load a single config file and parse it into CheckConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<CheckConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CheckError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CheckError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into CheckConfig.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<CheckConfig> {
    if content.trim().is_empty() {
        return Ok(CheckConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| CheckError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(None, temp.path()).unwrap();
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn discovers_file_in_working_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            "workers: 12\ndormant_after_months: 3\n",
        )
        .unwrap();

        let config = load_config(None, temp.path()).unwrap();

        assert_eq!(config.workers, 12);
        assert_eq!(config.dormant_after_months, 3);
        assert_eq!(config.retry.attempts, 3);
    }

    #[test]
    fn explicit_path_wins_over_discovery() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "workers: 12\n").unwrap();
        let other = temp.path().join("other.yml");
        fs::write(&other, "workers: 2\n").unwrap();

        let config = load_config(Some(&other), temp.path()).unwrap();

        assert_eq!(config.workers, 2);
    }

    #[test]
    fn explicit_missing_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");

        let err = load_config(Some(&missing), temp.path()).unwrap_err();

        assert!(matches!(err, CheckError::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "workers: [unclosed\n").unwrap();

        let err = load_config(None, temp.path()).unwrap_err();

        match err {
            CheckError::ConfigParseError { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_values_fail_validation() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            "tracked_providers:\n  azurerm: latest\n",
        )
        .unwrap();

        let err = load_config(None, temp.path()).unwrap_err();

        assert!(matches!(err, CheckError::ConfigValidationError { .. }));
    }

    #[test]
    fn empty_file_is_defaults() {
        let config = parse_config("\n", Path::new("avm-check.yml")).unwrap();
        assert_eq!(config, CheckConfig::default());
    }
}
