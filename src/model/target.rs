use super::SongReference;
use std::path::{Path, PathBuf};

/// Where a target stands in the resolution state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// Destination is free
    New,

    /// Destination already holds a previous download
    Conflicted,

    /// A conflict decision has been applied
    Resolved,
}

/// One requested download and its destination on disk
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    reference: SongReference,
    base_path: PathBuf,
    resolved_path: PathBuf,
    pub status: TargetStatus,
}

impl DownloadTarget {
    /// Create a target whose resolved path starts at the base path
    pub fn new(reference: SongReference, base_path: PathBuf) -> Self {
        Self {
            reference,
            resolved_path: base_path.clone(),
            base_path,
            status: TargetStatus::New,
        }
    }

    pub fn reference(&self) -> &SongReference {
        &self.reference
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn resolved_path(&self) -> &Path {
        &self.resolved_path
    }

    /// Redirect the target to a numbered sibling directory
    ///
    /// Only the renaming allocator hands out these paths.
    pub(crate) fn redirect_to(&mut self, path: PathBuf) {
        self.resolved_path = path;
    }

    pub fn is_conflicted(&self) -> bool {
        self.status == TargetStatus::Conflicted
    }
}

/// Action chosen for a conflicted target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// Delete the existing directory and download again
    Overwrite,

    /// Download into the next free numbered sibling directory
    Number,

    /// Leave the existing download alone
    Skip,

    /// Stop the whole run
    Quit,
}

/// Decision taken for one conflicted target
#[derive(Debug, Clone)]
pub struct ConflictDecision {
    pub target: DownloadTarget,
    pub action: ConflictAction,
}
