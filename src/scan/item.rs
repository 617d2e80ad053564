//! Work items: one row of the module index.

use serde::{Deserialize, Serialize};

/// One repository to scan.
///
/// Everything except [`repo_url`](Self::repo_url) is descriptive metadata
/// that is carried unchanged into the report. Field names on the wire match
/// the column headers of the module index CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WorkItem {
    pub provider_namespace: String,
    pub resource_type: String,
    pub module_display_name: String,
    pub alternative_names: String,
    pub module_name: String,
    pub module_status: String,
    #[serde(rename = "RepoURL")]
    pub repo_url: String,
    pub public_registry_reference: String,
    pub telemetry_id_prefix: String,
    #[serde(rename = "PrimaryModuleOwnerGHHandle")]
    pub primary_module_owner_gh_handle: String,
    pub primary_module_owner_display_name: String,
    #[serde(rename = "SecondaryModuleOwnerGHHandle")]
    pub secondary_module_owner_gh_handle: String,
    pub secondary_module_owner_display_name: String,
    #[serde(rename = "ModuleOwnersGHTeam")]
    pub module_owners_gh_team: String,
    #[serde(rename = "ModuleContributorsGHTeam")]
    pub module_contributors_gh_team: String,
    pub description: String,
    pub comments: String,
    pub first_published_in: String,
}

impl WorkItem {
    /// Create an item that only knows where its repository lives.
    pub fn from_url(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            ..Default::default()
        }
    }

    /// Human-readable label for logs and progress output.
    pub fn label(&self) -> &str {
        if self.module_name.is_empty() {
            &self.repo_url
        } else {
            &self.module_name
        }
    }
}
