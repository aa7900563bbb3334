//! Error taxonomy for target resolution, downloading and organization
//!
//! Per-target failures are recorded in the run summary rather than
//! propagated to `main`; only conditions that make the whole run
//! meaningless surface as `anyhow` errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving and processing download targets
#[derive(Debug, Error)]
pub enum FetchError {
    /// Input is neither a list file nor something that looks like a URL
    #[error("Could not determine if input is a URL or a path to a list file: {0}")]
    InvalidInputKind(String),

    /// Input looked like a URL but is not a usable song-details page
    #[error("Invalid song URL {url}: {reason}")]
    InvalidSongUrl { url: String, reason: String },

    /// No numbered sibling directory could be allocated
    #[error("Could not allocate a numbered directory next to {0}")]
    PathAllocationExhausted(PathBuf),

    /// Two pages of one instrument carry the same page number
    #[error("Duplicate page number {page} for instrument '{instrument}': {first} and {second}")]
    DuplicatePageNumber {
        instrument: String,
        page: u32,
        first: PathBuf,
        second: PathBuf,
    },

    /// Network or browser-side failure reported by the page source
    #[error("Download failed for {target}: {reason}")]
    DownloadFailure { target: String, reason: String },

    /// Local filesystem failure (permissions, disk space, ...)
    #[error("Filesystem error at {path}: {source}")]
    FilesystemFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn invalid_song_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSongUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn download(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DownloadFailure {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemFailure {
            path: path.into(),
            source,
        }
    }

    /// Whether this error rejects an input entry (counted as skipped)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidInputKind(_) | Self::InvalidSongUrl { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(FetchError::InvalidInputKind("foo".into()).is_validation());
        assert!(FetchError::invalid_song_url("https://x", "bad").is_validation());
        assert!(!FetchError::PathAllocationExhausted(PathBuf::from("/a")).is_validation());
        assert!(!FetchError::download("song", "timeout").is_validation());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = FetchError::invalid_song_url("https://example.com", "missing /songs/details/");
        let message = err.to_string();
        assert!(message.contains("https://example.com"));
        assert!(message.contains("missing /songs/details/"));
    }
}
