//! Repository scanning.
//!
//! This module holds the scan engine: the stages that turn one module
//! repository into an [`Outcome`], the [`Dispatcher`] that runs them over
//! many repositories at once, and the [`summarize`] pass over the results.
//!
//! # Stages
//!
//! 1. [`Acquirer`] makes a shallow clone into a scratch directory
//! 2. [`extract`] reads the provider requirements of the Terraform module
//! 3. [`satisfies`] checks each tracked provider against its floor version
//! 4. [`last_activity`] reads the most recent commit
//!
//! [`ItemPipeline`] chains the stages and records every failure on the
//! outcome with an [`ErrorKind`].

pub mod acquire;
pub mod activity;
pub mod cancel;
pub mod constraint;
pub mod dispatcher;
pub mod extract;
pub mod git;
pub mod hcl;
pub mod item;
pub mod outcome;
pub mod pipeline;
pub mod summary;

pub use acquire::{AcquireError, Acquirer, Checkout};
pub use activity::{last_activity, Activity};
pub use cancel::CancelToken;
pub use constraint::{satisfies, Constraints, Version};
pub use dispatcher::{Dispatcher, NoProgress, ProgressSink};
pub use extract::extract;
pub use git::{GitError, GitLimits};
pub use item::WorkItem;
pub use outcome::{ErrorKind, Outcome, ProviderRequirement};
pub use pipeline::{ItemPipeline, Processor, RetryPolicy};
pub use summary::{analyze, summarize, Analysis, Summary};
