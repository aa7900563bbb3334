//! Data model for download targets and run bookkeeping
//!
//! These types are independent of where songs come from (URL or list
//! file) and of how pages are fetched.

mod reference;
mod summary;
mod target;

pub use reference::SongReference;
pub use summary::{Outcome, RunSummary};
pub use target::{ConflictAction, ConflictDecision, DownloadTarget, TargetStatus};
