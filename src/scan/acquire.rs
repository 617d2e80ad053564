//! Content acquisition: shallow clones into scratch directories.
//!
//! Each clone lives in a fresh `repo-XXXXXX` directory owned by a
//! [`Checkout`]. Dropping the checkout deletes the directory, so a clone
//! can't outlive the pipeline invocation that made it, and a failed clone
//! leaves nothing behind.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::git::{self, GitError, GitLimits};

/// Prefix of scratch directory names.
pub const SCRATCH_PREFIX: &str = "repo-";

/// Why a single clone attempt failed.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The location was empty.
    #[error("repository location is empty")]
    EmptyLocation,

    /// The scratch directory could not be created.
    #[error("could not create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// `git clone` failed or timed out.
    #[error("git clone failed: {0}")]
    Clone(#[source] GitError),

    /// The run was cancelled mid-clone.
    #[error("clone cancelled")]
    Cancelled,
}

impl AcquireError {
    /// Whether retrying can help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AcquireError::Cancelled | AcquireError::EmptyLocation)
    }
}

/// A local clone. The directory is removed on drop.
#[derive(Debug)]
pub struct Checkout {
    dir: tempfile::TempDir,
}

impl Checkout {
    /// Path to the working tree.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Makes shallow clones.
#[derive(Debug, Clone)]
pub struct Acquirer {
    scratch_root: PathBuf,
    limits: GitLimits,
}

impl Acquirer {
    /// Create an acquirer that clones under `scratch_root`.
    pub fn new(scratch_root: impl Into<PathBuf>, limits: GitLimits) -> Self {
        Self {
            scratch_root: scratch_root.into(),
            limits,
        }
    }

    /// Directory that holds scratch clones.
    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Deadline and cancellation applied to each `git` call.
    pub fn limits(&self) -> &GitLimits {
        &self.limits
    }

    /// One attempt to clone `location` at depth 1.
    pub fn acquire(&self, location: &str) -> Result<Checkout, AcquireError> {
        if location.trim().is_empty() {
            return Err(AcquireError::EmptyLocation);
        }

        std::fs::create_dir_all(&self.scratch_root).map_err(AcquireError::Scratch)?;
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.scratch_root)
            .map_err(AcquireError::Scratch)?;

        tracing::debug!("Cloning {} into {}", location, dir.path().display());

        let args: [&OsStr; 5] = [
            OsStr::new("clone"),
            OsStr::new("--depth"),
            OsStr::new("1"),
            OsStr::new(location),
            dir.path().as_os_str(),
        ];

        // On error `dir` drops here and takes the partial clone with it.
        match git::run(args, None, &self.limits) {
            Ok(_) => Ok(Checkout { dir }),
            Err(GitError::Cancelled) => Err(AcquireError::Cancelled),
            Err(e) => Err(AcquireError::Clone(e)),
        }
    }
}
