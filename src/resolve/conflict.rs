//! Up-front conflict detection

use super::paths::arrangement_path;
use crate::model::{DownloadTarget, SongReference, TargetStatus};
use std::fs;
use std::path::Path;

/// Build one target per reference, in input order
pub fn build_targets(references: Vec<SongReference>, output_root: &Path) -> Vec<DownloadTarget> {
    references
        .into_iter()
        .map(|reference| {
            let base_path = arrangement_path(&reference, output_root);
            DownloadTarget::new(reference, base_path)
        })
        .collect()
}

/// Whether `path` is a directory with at least one entry
pub fn holds_previous_download(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Classify every target as `New` or `Conflicted`
///
/// Only reads the filesystem. Returns the number of conflicts found.
pub fn detect_conflicts(targets: &mut [DownloadTarget]) -> usize {
    let mut conflicts = 0;
    for target in targets.iter_mut() {
        target.status = if holds_previous_download(target.base_path()) {
            conflicts += 1;
            TargetStatus::Conflicted
        } else {
            TargetStatus::New
        };
    }

    log::debug!("Conflict scan: {} of {} targets conflicted", conflicts, targets.len());
    conflicts
}
