//! Destination paths for download targets

use crate::error::FetchError;
use crate::model::{DownloadTarget, SongReference};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Consecutive failed existence probes before giving up on a base path
const MAX_PROBE_FAILURES: u32 = 32;

/// Directory an arrangement is downloaded into: `root/song/arrangement`
pub fn arrangement_path(reference: &SongReference, output_root: &Path) -> PathBuf {
    output_root
        .join(reference.song_slug())
        .join(reference.arrangement_slug())
}

/// `base_path` with `_n` appended to its last component
pub fn numbered_sibling(base_path: &Path, n: u32) -> PathBuf {
    let mut name = OsString::from(base_path.as_os_str());
    name.push(format!("_{}", n));
    PathBuf::from(name)
}

/// Hands out numbered sibling directories (`base_1`, `base_2`, ...)
///
/// Every call probes the filesystem again. Paths handed out earlier in the
/// same run count as taken even if nothing has been written there yet, so
/// two targets numbering against one base never collide.
#[derive(Debug, Default)]
pub struct RenamingAllocator {
    reserved: HashSet<PathBuf>,
}

impl RenamingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat the base paths of `targets` as taken
    ///
    /// Called with every target of a run before numbering starts, so a
    /// numbered sibling never lands on another target's destination.
    pub fn reserve(&mut self, targets: &[DownloadTarget]) {
        self.reserved
            .extend(targets.iter().map(|target| target.base_path().to_path_buf()));
    }

    /// Smallest free `base_path_n` with `n >= 1`
    pub fn allocate(&mut self, base_path: &Path) -> Result<PathBuf, FetchError> {
        let mut failures = 0;

        for n in 1..=u32::MAX {
            let candidate = numbered_sibling(base_path, n);
            if self.reserved.contains(&candidate) {
                continue;
            }

            match candidate.try_exists() {
                Ok(true) => failures = 0,
                Ok(false) => {
                    log::debug!("Allocated {:?} for {:?}", candidate, base_path);
                    self.reserved.insert(candidate.clone());
                    return Ok(candidate);
                }
                Err(e) => {
                    log::warn!("Could not probe {:?}: {}", candidate, e);
                    failures += 1;
                    if failures >= MAX_PROBE_FAILURES {
                        break;
                    }
                }
            }
        }

        Err(FetchError::PathAllocationExhausted(base_path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_arrangement_path() {
        let reference = SongReference::new("way-maker", "orchestration", "https://x").unwrap();
        assert_eq!(
            arrangement_path(&reference, Path::new("charts")),
            PathBuf::from("charts/way-maker/orchestration")
        );
    }

    #[test]
    fn test_numbered_sibling() {
        assert_eq!(
            numbered_sibling(Path::new("charts/song/lead"), 3),
            PathBuf::from("charts/song/lead_3")
        );
    }

    #[test]
    fn test_allocates_first_free_number() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("lead");
        fs::create_dir(&base).unwrap();

        let mut allocator = RenamingAllocator::new();
        assert_eq!(allocator.allocate(&base).unwrap(), dir.path().join("lead_1"));
    }

    #[test]
    fn test_successive_allocations_never_collide() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("lead");
        for name in ["lead", "lead_1", "lead_2"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let mut allocator = RenamingAllocator::new();
        assert_eq!(allocator.allocate(&base).unwrap(), dir.path().join("lead_3"));
        assert_eq!(allocator.allocate(&base).unwrap(), dir.path().join("lead_4"));
    }

    #[test]
    fn test_fills_gaps() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("lead");
        for name in ["lead", "lead_1", "lead_3"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let mut allocator = RenamingAllocator::new();
        assert_eq!(allocator.allocate(&base).unwrap(), dir.path().join("lead_2"));
        assert_eq!(allocator.allocate(&base).unwrap(), dir.path().join("lead_4"));
    }

    #[test]
    fn test_rechecks_filesystem_each_call() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("lead");

        let mut allocator = RenamingAllocator::new();
        let first = allocator.allocate(&base).unwrap();
        fs::create_dir(dir.path().join("lead_2")).unwrap();

        assert_eq!(first, dir.path().join("lead_1"));
        assert_eq!(allocator.allocate(&base).unwrap(), dir.path().join("lead_3"));
    }

    #[test]
    fn test_skips_base_paths_of_other_targets() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("lead");
        fs::create_dir(&base).unwrap();

        let reference = SongReference::new("song", "lead_1", "https://x").unwrap();
        let other = DownloadTarget::new(reference, dir.path().join("lead_1"));

        let mut allocator = RenamingAllocator::new();
        allocator.reserve(&[other]);
        assert_eq!(allocator.allocate(&base).unwrap(), dir.path().join("lead_2"));
    }
}
