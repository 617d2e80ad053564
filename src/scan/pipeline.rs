//! Per-repository processing.
//!
//! [`ItemPipeline`] runs the stages for one work item in order: clone (with
//! retries), extract provider requirements, evaluate tracked providers
//! against their floors, then read the last commit. Every failure ends up on
//! the returned [`Outcome`]; nothing escapes as an error.

use std::collections::BTreeMap;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use super::acquire::{AcquireError, Acquirer, Checkout};
use super::activity::last_activity;
use super::constraint::satisfies;
use super::extract::extract;
use super::git::GitLimits;
use super::item::WorkItem;
use super::outcome::{
    ErrorKind, Outcome, ProviderRequirement, CHECK_FAILED, CLONE_FAILED, COMMIT_INFO_FAILED,
    PARSE_FAILED,
};
use crate::config::CheckConfig;
use crate::scan::CancelToken;

/// Longest uninterrupted sleep while waiting between attempts.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// How clone attempts are repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Fixed wait between failed attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Turns one work item into one outcome.
pub trait Processor: Sync {
    fn process(&self, item: &WorkItem) -> Outcome;
}

/// The real processor: git, Terraform and version checks.
#[derive(Debug, Clone)]
pub struct ItemPipeline {
    tracked: BTreeMap<String, String>,
    acquirer: Acquirer,
    retry: RetryPolicy,
    quiet: bool,
}

impl ItemPipeline {
    /// Create a pipeline checking `tracked` providers (name -> floor version).
    pub fn new(tracked: BTreeMap<String, String>, acquirer: Acquirer) -> Self {
        Self {
            tracked,
            acquirer,
            retry: RetryPolicy::default(),
            quiet: false,
        }
    }

    /// Build a pipeline from loaded configuration.
    pub fn from_config(config: &CheckConfig, cancel: CancelToken) -> Self {
        let limits = GitLimits {
            timeout: config.clone_timeout(),
            cancel,
        };
        Self::new(
            config.tracked_providers.clone(),
            Acquirer::new(config.scratch_root(), limits),
        )
        .with_retry(config.retry_policy())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Suppress per-item warnings.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn cancel(&self) -> &CancelToken {
        &self.acquirer.limits().cancel
    }

    /// Clone `location`, retrying failed attempts per the retry policy.
    fn acquire_with_retry(&self, location: &str) -> Result<Checkout, AcquireError> {
        self.retry_attempts(
            location,
            || self.acquirer.acquire(location),
            |delay| self.wait(delay),
        )
    }

    /// Call `attempt` until it succeeds, fails for good or runs out of tries.
    ///
    /// `wait` runs between failed attempts, never after the last one, and
    /// returns false to stop early on cancellation.
    fn retry_attempts<T>(
        &self,
        location: &str,
        mut attempt: impl FnMut() -> Result<T, AcquireError>,
        mut wait: impl FnMut(Duration) -> bool,
    ) -> Result<T, AcquireError> {
        let attempts = self.retry.attempts.max(1);
        let mut tried = 1;
        loop {
            if self.cancel().is_cancelled() {
                return Err(AcquireError::Cancelled);
            }
            let err = match attempt() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_retryable() {
                return Err(err);
            }
            if !self.quiet {
                tracing::warn!(
                    "Attempt {}: Failed to clone repo '{}': {}",
                    tried,
                    location,
                    err
                );
            }
            if tried >= attempts {
                return Err(err);
            }
            tried += 1;
            if !wait(self.retry.delay) {
                return Err(AcquireError::Cancelled);
            }
        }
    }

    /// Sleep for `delay`, waking early on cancellation. False if cancelled.
    fn wait(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        loop {
            if self.cancel().is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(CANCEL_CHECK_INTERVAL));
        }
    }

    /// Fold each tracked provider's constraints into `compatibility`.
    ///
    /// A provider is compatible only if every constraint it declares admits
    /// the floor. Returns the failure message for the first malformed one.
    fn evaluate(
        &self,
        providers: &[ProviderRequirement],
        compatibility: &mut BTreeMap<String, bool>,
    ) -> Result<(), String> {
        for req in providers {
            let Some(floor) = self.tracked.get(&req.provider_name) else {
                continue;
            };
            match satisfies(floor, &req.version) {
                Ok(ok) => {
                    tracing::debug!(
                        "{} {:?} against floor {}: {}",
                        req.provider_name,
                        req.version,
                        floor,
                        ok
                    );
                    *compatibility
                        .entry(req.provider_name.clone())
                        .or_insert(true) &= ok;
                }
                Err(e) => {
                    compatibility.remove(&req.provider_name);
                    return Err(format!(
                        "{} for provider '{}': {}",
                        CHECK_FAILED, req.provider_name, e
                    ));
                }
            }
        }
        Ok(())
    }

    /// Record the last commit of the checkout at `path`.
    ///
    /// Failure here is not fatal: the outcome keeps everything found so far.
    fn inspect(&self, outcome: &mut Outcome, path: &Path) {
        match last_activity(path, self.acquirer.limits()) {
            Ok(activity) => {
                outcome.last_commit_date = Some(activity.date);
                outcome.last_commit_author = Some(activity.author);
            }
            Err(e) => {
                let message = format!("{}: {}", COMMIT_INFO_FAILED, e);
                if !self.quiet {
                    tracing::warn!("{}: {}", outcome.item.label(), message);
                }
                outcome.record_failure(ErrorKind::InspectionFailed, message);
            }
        }
    }
}

impl Processor for ItemPipeline {
    fn process(&self, item: &WorkItem) -> Outcome {
        let mut outcome = Outcome::new(item.clone());
        let url = &item.repo_url;

        tracing::debug!("Processing {}", item.label());

        let checkout = match self.acquire_with_retry(url) {
            Ok(checkout) => checkout,
            Err(e) => {
                let kind = match e {
                    AcquireError::Cancelled => ErrorKind::Cancelled,
                    _ => ErrorKind::AcquisitionFailed,
                };
                outcome.record_failure(kind, format!("{} '{}': {}", CLONE_FAILED, url, e));
                return outcome;
            }
        };

        let providers = match extract(checkout.path()) {
            Ok(providers) => providers,
            Err(e) => {
                outcome.record_failure(
                    ErrorKind::ExtractionFailed,
                    format!("{}: {}", PARSE_FAILED, e),
                );
                return outcome;
            }
        };

        let mut compatibility = BTreeMap::new();
        let evaluated = self.evaluate(&providers, &mut compatibility);
        outcome.providers = providers;
        outcome.compatibility = compatibility;
        if let Err(message) = evaluated {
            outcome.record_failure(ErrorKind::EvaluationFailed, message);
            return outcome;
        }

        self.inspect(&mut outcome, checkout.path());

        tracing::debug!("Finished {}", item.label());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::acquire::tests::{create_repo, file_url, GIT_LOCK};
    use crate::scan::GitError;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const VERSIONS_TF: &str = r#"
terraform {
  required_providers {
    azurerm = {
      source  = "hashicorp/azurerm"
      version = ">= 3.71, < 5.0"
    }
    azapi = {
      source  = "Azure/azapi"
      version = "~> 2.0"
    }
    random = {
      source  = "hashicorp/random"
      version = "~> 3.5"
    }
  }
}
"#;

    fn tracked() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("azurerm".to_string(), "4.0.0".to_string()),
            ("azapi".to_string(), "2.0.0".to_string()),
        ])
    }

    fn pipeline(scratch: &Path) -> ItemPipeline {
        ItemPipeline::new(tracked(), Acquirer::new(scratch, GitLimits::default()))
            .with_retry(RetryPolicy {
                attempts: 3,
                delay: Duration::ZERO,
            })
            .quiet(true)
    }

    fn scratch_entries(root: &Path) -> Vec<PathBuf> {
        match std::fs::read_dir(root) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    #[test]
    fn default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn compliant_repository() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let repo = create_repo(temp.path(), "origin", &[("versions.tf", VERSIONS_TF)]);
        let scratch = temp.path().join("scratch");

        let outcome = pipeline(&scratch).process(&WorkItem::from_url(file_url(&repo)));

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.error_kind, None);
        assert_eq!(outcome.providers.len(), 3);
        assert_eq!(
            outcome.compatibility,
            BTreeMap::from([("azapi".to_string(), true), ("azurerm".to_string(), true)])
        );
        assert_eq!(outcome.last_commit_author.as_deref(), Some("Test Author"));
        assert!(outcome.last_commit_date.is_some());
        assert!(scratch_entries(&scratch).is_empty());
    }

    #[test]
    fn outdated_constraint_is_non_compliant() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let repo = create_repo(
            temp.path(),
            "origin",
            &[(
                "main.tf",
                "terraform {\n  required_providers {\n    azurerm = { version = \"~> 3.0\" }\n  }\n}\n",
            )],
        );
        let scratch = temp.path().join("scratch");

        let outcome = pipeline(&scratch).process(&WorkItem::from_url(file_url(&repo)));

        assert_eq!(outcome.compatibility.get("azurerm"), Some(&false));
        assert!(outcome.is_non_compliant());
        assert!(scratch_entries(&scratch).is_empty());
    }

    #[test]
    fn every_constraint_of_a_provider_must_hold() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let repo = create_repo(
            temp.path(),
            "origin",
            &[(
                "main.tf",
                "terraform {\n  required_providers {\n    azurerm = { version = \">= 3.0\" }\n  }\n}\n\nprovider \"azurerm\" {\n  version = \"< 4.0\"\n  features {}\n}\n",
            )],
        );
        let scratch = temp.path().join("scratch");

        let outcome = pipeline(&scratch).process(&WorkItem::from_url(file_url(&repo)));

        assert_eq!(outcome.providers.len(), 2);
        assert_eq!(outcome.compatibility.get("azurerm"), Some(&false));
    }

    #[test]
    fn unreachable_repository_after_all_attempts() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        let url = file_url(&temp.path().join("missing"));

        let outcome = pipeline(&scratch).process(&WorkItem::from_url(&url));

        assert_eq!(outcome.error_kind, Some(ErrorKind::AcquisitionFailed));
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .starts_with(&format!("failed to clone repo '{}'", url)));
        assert!(outcome.providers.is_empty());
        assert!(outcome.compatibility.is_empty());
        assert!(outcome.is_unreachable());
        assert!(scratch_entries(&scratch).is_empty());
    }

    #[test]
    fn repository_without_terraform_fails_extraction() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let repo = create_repo(temp.path(), "origin", &[("README.md", "# docs\n")]);
        let scratch = temp.path().join("scratch");

        let outcome = pipeline(&scratch).process(&WorkItem::from_url(file_url(&repo)));

        assert_eq!(outcome.error_kind, Some(ErrorKind::ExtractionFailed));
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .starts_with("failed to parse Terraform module: "));
        assert!(outcome.last_commit_date.is_none());
        assert!(scratch_entries(&scratch).is_empty());
    }

    #[test]
    fn malformed_constraint_fails_evaluation() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let repo = create_repo(
            temp.path(),
            "origin",
            &[(
                "main.tf",
                "terraform {\n  required_providers {\n    azurerm = \"not-a-version\"\n  }\n}\n",
            )],
        );
        let scratch = temp.path().join("scratch");

        let outcome = pipeline(&scratch).process(&WorkItem::from_url(file_url(&repo)));

        assert_eq!(outcome.error_kind, Some(ErrorKind::EvaluationFailed));
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .contains("for provider 'azurerm'"));
        assert_eq!(outcome.providers.len(), 1);
        assert!(outcome.compatibility.is_empty());
        assert!(outcome.last_commit_date.is_none());
    }

    #[test]
    fn untracked_providers_are_not_evaluated() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let repo = create_repo(
            temp.path(),
            "origin",
            &[(
                "main.tf",
                "terraform {\n  required_providers {\n    random = \"garbage\"\n  }\n}\n",
            )],
        );
        let scratch = temp.path().join("scratch");

        let outcome = pipeline(&scratch).process(&WorkItem::from_url(file_url(&repo)));

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.providers.len(), 1);
        assert!(outcome.compatibility.is_empty());
    }

    #[test]
    fn inspection_failure_keeps_earlier_results() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(&temp.path().join("scratch"));
        let mut outcome = Outcome::new(WorkItem::from_url("https://example.com/repo"));
        outcome.providers = vec![ProviderRequirement::new("azurerm", ">= 4.0")];
        outcome.compatibility.insert("azurerm".into(), true);

        // Not a git repository.
        pipeline.inspect(&mut outcome, temp.path());

        assert_eq!(outcome.error_kind, Some(ErrorKind::InspectionFailed));
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .starts_with("could not retrieve last commit info: "));
        assert_eq!(outcome.providers.len(), 1);
        assert_eq!(outcome.compatibility.get("azurerm"), Some(&true));
        assert!(outcome.last_commit_date.is_none());
        assert!(outcome.last_commit_author.is_none());
    }

    #[test]
    fn cancelled_run_stops_before_cloning() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        let limits = GitLimits::default();
        limits.cancel.cancel();
        let pipeline = ItemPipeline::new(tracked(), Acquirer::new(&scratch, limits)).quiet(true);

        let outcome = pipeline.process(&WorkItem::from_url("https://example.com/repo"));

        assert_eq!(outcome.error_kind, Some(ErrorKind::Cancelled));
        assert!(scratch_entries(&scratch).is_empty());
    }

    fn clone_failure() -> AcquireError {
        AcquireError::Clone(GitError::TimedOut(Duration::from_secs(1)))
    }

    fn retrying(attempts: u32) -> ItemPipeline {
        ItemPipeline::new(tracked(), Acquirer::new("unused", GitLimits::default()))
            .with_retry(RetryPolicy {
                attempts,
                delay: Duration::from_secs(7),
            })
            .quiet(true)
    }

    #[test]
    fn failing_clone_is_tried_exactly_attempts_times() {
        let events = RefCell::new(Vec::new());

        let result: Result<(), _> = retrying(3).retry_attempts(
            "https://example.com/repo",
            || {
                events.borrow_mut().push("attempt".to_string());
                Err(clone_failure())
            },
            |delay| {
                events.borrow_mut().push(format!("wait {}s", delay.as_secs()));
                true
            },
        );

        assert!(matches!(result, Err(AcquireError::Clone(_))));
        assert_eq!(
            events.into_inner(),
            ["attempt", "wait 7s", "attempt", "wait 7s", "attempt"]
        );
    }

    #[test]
    fn single_attempt_policy_never_waits() {
        let waits = Cell::new(0);
        let calls = Cell::new(0);

        let result: Result<(), _> = retrying(1).retry_attempts(
            "https://example.com/repo",
            || {
                calls.set(calls.get() + 1);
                Err(clone_failure())
            },
            |_| {
                waits.set(waits.get() + 1);
                true
            },
        );

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
        assert_eq!(waits.get(), 0);
    }

    #[test]
    fn non_retryable_failure_stops_immediately() {
        let calls = Cell::new(0);

        let result: Result<(), _> = retrying(3).retry_attempts(
            "",
            || {
                calls.set(calls.get() + 1);
                Err(AcquireError::EmptyLocation)
            },
            |_| true,
        );

        assert!(matches!(result, Err(AcquireError::EmptyLocation)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn cancelled_wait_ends_retries() {
        let calls = Cell::new(0);

        let result: Result<(), _> = retrying(3).retry_attempts(
            "https://example.com/repo",
            || {
                calls.set(calls.get() + 1);
                Err(clone_failure())
            },
            |_| false,
        );

        assert!(matches!(result, Err(AcquireError::Cancelled)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn second_attempt_succeeds_and_leaves_no_scratch() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let repo = create_repo(temp.path(), "origin", &[("versions.tf", VERSIONS_TF)]);
        let scratch = temp.path().join("scratch");
        let pipeline = pipeline(&scratch);
        let missing = file_url(&temp.path().join("missing"));
        let good = file_url(&repo);
        let calls = Cell::new(0);
        let waits = Cell::new(0);

        let checkout = pipeline
            .retry_attempts(
                &good,
                || {
                    calls.set(calls.get() + 1);
                    let location = if calls.get() == 1 { &missing } else { &good };
                    pipeline.acquirer.acquire(location)
                },
                |_| {
                    waits.set(waits.get() + 1);
                    true
                },
            )
            .unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(waits.get(), 1);
        assert!(checkout.path().join("versions.tf").exists());
        assert_eq!(scratch_entries(&scratch).len(), 1);

        drop(checkout);
        assert!(scratch_entries(&scratch).is_empty());
    }

    #[test]
    fn wait_returns_early_when_cancelled() {
        let temp = TempDir::new().unwrap();
        let limits = GitLimits::default();
        limits.cancel.cancel();
        let pipeline = ItemPipeline::new(tracked(), Acquirer::new(temp.path(), limits));

        let started = Instant::now();
        assert!(!pipeline.wait(Duration::from_secs(30)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
