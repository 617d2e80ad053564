//! The module index: the CSV list of repositories to scan.
//!
//! - Downloading it in [`fetch`]
//! - Parsing it into [`WorkItem`](crate::scan::WorkItem)s in [`records`]

pub mod fetch;
pub mod records;

pub use fetch::{DownloadStatus, SourceFetcher};
pub use records::{parse_work_items, read_work_items};
