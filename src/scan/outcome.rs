//! Per-repository scan results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::item::WorkItem;

/// One `(provider, constraint)` pair declared by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequirement {
    /// Provider local name, e.g. `azurerm`.
    pub provider_name: String,
    /// Declared constraint expression, e.g. `>= 3.71, < 5.0`.
    pub version: String,
}

impl ProviderRequirement {
    /// Create a requirement.
    pub fn new(provider_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            version: version.into(),
        }
    }
}

/// Leading text of each stage's failure message.
pub const CLONE_FAILED: &str = "failed to clone repo";
pub const PARSE_FAILED: &str = "failed to parse Terraform module";
pub const CHECK_FAILED: &str = "failed to check version constraints";
pub const COMMIT_INFO_FAILED: &str = "could not retrieve last commit info";

/// The stage that failed while scanning a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Every clone attempt failed.
    AcquisitionFailed,
    /// The Terraform module could not be loaded.
    ExtractionFailed,
    /// A declared constraint (or a configured floor) was malformed.
    EvaluationFailed,
    /// The last commit could not be read. Other fields are still valid.
    InspectionFailed,
    /// The run was cancelled before this repository finished.
    Cancelled,
}

impl ErrorKind {
    /// The kind whose failure message starts `message`.
    fn from_message(message: &str) -> Option<Self> {
        [
            (CLONE_FAILED, ErrorKind::AcquisitionFailed),
            (PARSE_FAILED, ErrorKind::ExtractionFailed),
            (CHECK_FAILED, ErrorKind::EvaluationFailed),
            (COMMIT_INFO_FAILED, ErrorKind::InspectionFailed),
        ]
        .into_iter()
        .find(|(prefix, _)| message.starts_with(prefix))
        .map(|(_, kind)| kind)
    }

    /// Whether this failure stopped the scan of the repository.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrorKind::InspectionFailed)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::AcquisitionFailed => "acquisition failed",
            ErrorKind::ExtractionFailed => "extraction failed",
            ErrorKind::EvaluationFailed => "evaluation failed",
            ErrorKind::InspectionFailed => "inspection failed",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Everything learned about one [`WorkItem`].
///
/// Fields after the item are filled in stage order; a fatal failure leaves
/// the later ones empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(flatten)]
    pub item: WorkItem,

    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: Vec<ProviderRequirement>,

    /// Tracked provider name -> whether its declared constraints admit the floor.
    #[serde(default, deserialize_with = "null_as_default")]
    pub compatibility: BTreeMap<String, bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

/// Older reports write empty collections as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Outcome {
    /// An outcome with nothing learned yet.
    pub fn new(item: WorkItem) -> Self {
        Self {
            item,
            providers: Vec::new(),
            compatibility: BTreeMap::new(),
            last_commit_date: None,
            last_commit_author: None,
            error: None,
            error_kind: None,
        }
    }

    /// An outcome for an item that was never processed.
    pub fn cancelled(item: WorkItem) -> Self {
        let mut outcome = Self::new(item);
        outcome.record_failure(ErrorKind::Cancelled, "skipped: run was cancelled");
        outcome
    }

    /// Record a failure.
    ///
    /// Text is appended to any existing error with ` | `. The first fatal kind
    /// recorded wins; a non-fatal kind never replaces a fatal one.
    pub fn record_failure(&mut self, kind: ErrorKind, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.error = Some(match self.error.take() {
            Some(existing) if !existing.is_empty() => format!("{} | {}", existing, message),
            _ => message.to_string(),
        });
        self.error_kind = match self.error_kind {
            Some(existing) if existing.is_fatal() || !kind.is_fatal() => Some(existing),
            _ => Some(kind),
        };
    }

    /// Fill in a missing `error_kind` from the error text.
    ///
    /// Reports written before kinds existed carry only the message. Each
    /// ` | `-separated part is matched by its fixed prefix, with the same
    /// precedence as [`record_failure`](Self::record_failure).
    pub fn infer_error_kind(&mut self) {
        if self.error_kind.is_some() {
            return;
        }
        let Some(error) = self.error.as_deref() else {
            return;
        };
        for part in error.split(" | ").map(str::trim) {
            let Some(kind) = ErrorKind::from_message(part) else {
                continue;
            };
            self.error_kind = match self.error_kind {
                Some(existing) if existing.is_fatal() || !kind.is_fatal() => Some(existing),
                _ => Some(kind),
            };
        }
    }

    /// Whether the repository could not be cloned.
    pub fn is_unreachable(&self) -> bool {
        self.error_kind == Some(ErrorKind::AcquisitionFailed)
    }

    /// Whether any tracked provider's constraints exclude its floor.
    pub fn is_non_compliant(&self) -> bool {
        self.compatibility.values().any(|ok| !ok)
    }

    /// Whether the last commit is strictly older than `cutoff`.
    pub fn is_dormant_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_commit_date.is_some_and(|date| date < cutoff)
    }
}
