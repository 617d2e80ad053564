//! Last-commit inspection.

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;

use super::git::{self, GitLimits};

/// The most recent commit of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub date: DateTime<Utc>,
    pub author: String,
}

/// Read the time and author of the most recent commit at `repo`.
pub fn last_activity(repo: &Path, limits: &GitLimits) -> anyhow::Result<Activity> {
    let out = git::run(["log", "-1", "--format=%ct|%an"], Some(repo), limits)
        .map_err(|e| anyhow::anyhow!("failed to get last commit: {}", e))?;
    parse_log_line(&out)
}

/// Parse `<epoch>|<author>` as printed by `git log --format=%ct|%an`.
fn parse_log_line(line: &str) -> anyhow::Result<Activity> {
    let (epoch, author) = line
        .split_once('|')
        .ok_or_else(|| anyhow::anyhow!("unexpected format for last commit info"))?;

    let epoch = epoch.trim();
    let secs: i64 = epoch
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid epoch time '{}': {}", epoch, e))?;
    let date = Utc
        .timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("epoch time '{}' is out of range", epoch))?;

    Ok(Activity {
        date,
        author: author.trim().to_string(),
    })
}
