//! Configuration validation rules.
//!
//! - Every tracked provider floor must be a valid version
//! - At least one worker and one clone attempt
//! - Dormancy threshold of at least one month

use crate::config::schema::CheckConfig;
use crate::error::{CheckError, Result};
use crate::scan::Version;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &CheckConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (provider, floor) in &config.tracked_providers {
        if let Err(e) = Version::parse(floor) {
            errors.push(ValidationError::new(
                "invalid-floor",
                format!("Floor for provider '{}' is not a version: {}", provider, e),
            ));
        }
    }

    if config.workers == 0 {
        errors.push(ValidationError::new(
            "no-workers",
            "workers must be at least 1".to_string(),
        ));
    }

    if config.retry.attempts == 0 {
        errors.push(ValidationError::new(
            "no-attempts",
            "retry.attempts must be at least 1".to_string(),
        ));
    }

    if config.dormant_after_months == 0 {
        errors.push(ValidationError::new(
            "dormancy-threshold",
            "dormant_after_months must be at least 1".to_string(),
        ));
    }

    errors
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &CheckConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(CheckError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
