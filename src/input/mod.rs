//! Input classification and validation
//!
//! Decides whether a raw argument is a list file or a song-details URL and
//! turns either into validated `SongReference`s.

pub mod list;
pub mod song_url;

pub use list::{parse_list, read_list_file, ListEntries, RejectedEntry};
pub use song_url::{is_song_details_url, normalize_url, parse_song_url};

use crate::error::FetchError;
use std::path::{Path, PathBuf};

/// What a raw input argument refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Path to a file holding one URL per line
    ListFile(PathBuf),

    /// Normalized URL (not yet checked for being a song-details page)
    SongUrl(String),
}

/// Classify a raw input string
///
/// * ends with `.<list_extension>` or names an existing file -> list file
/// * starts with `http(s)://` or a bare song-details prefix -> URL
/// * anything else -> `InvalidInputKind`
pub fn classify_input(raw: &str, list_extension: &str) -> Result<InputKind, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidInputKind("empty input".to_string()));
    }

    let path = Path::new(trimmed);
    let suffix = format!(".{}", list_extension.to_ascii_lowercase());
    if trimmed.to_ascii_lowercase().ends_with(&suffix) || path.is_file() {
        return Ok(InputKind::ListFile(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(FetchError::InvalidInputKind(format!(
            "{} is a directory, not a file",
            trimmed
        )));
    }

    if song_url::has_scheme(trimmed) || song_url::has_bare_song_prefix(trimmed) {
        return normalize_url(trimmed)
            .map(InputKind::SongUrl)
            .ok_or_else(|| FetchError::invalid_song_url(trimmed, "not a URL"));
    }

    Err(FetchError::InvalidInputKind(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_extension_is_list_file() {
        assert_eq!(
            classify_input("songs.TXT", "txt").unwrap(),
            InputKind::ListFile(PathBuf::from("songs.TXT"))
        );
    }

    #[test]
    fn test_existing_file_is_list_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("urls.list");
        fs::write(&path, "").unwrap();

        let kind = classify_input(path.to_str().unwrap(), "txt").unwrap();
        assert_eq!(kind, InputKind::ListFile(path));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = classify_input(dir.path().to_str().unwrap(), "txt").unwrap_err();
        assert!(matches!(err, FetchError::InvalidInputKind(_)));
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            classify_input("https://www.praisecharts.com/songs/details/1/a", "txt").unwrap(),
            InputKind::SongUrl("https://www.praisecharts.com/songs/details/1/a".to_string())
        );
        assert_eq!(
            classify_input("www.praisecharts.com/songs/details/1/a", "txt").unwrap(),
            InputKind::SongUrl("https://www.praisecharts.com/songs/details/1/a".to_string())
        );
    }

    #[test]
    fn test_unrecognized_inputs() {
        for raw in ["", "hello", "example.com/songs/details/1/a", "ftp://x"] {
            let err = classify_input(raw, "txt").unwrap_err();
            assert!(err.is_validation(), "{:?} should be a validation error", raw);
        }
    }

    #[test]
    fn test_broken_url_is_invalid_song_url() {
        let err = classify_input("https://exa mple.com", "txt").unwrap_err();
        assert!(matches!(err, FetchError::InvalidSongUrl { .. }));
    }
}
