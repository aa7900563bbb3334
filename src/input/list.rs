//! URL list files: one song-details URL per line

use super::song_url::{has_bare_song_prefix, has_scheme, parse_song_url};
use crate::error::FetchError;
use crate::model::SongReference;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Lines starting with this marker are ignored
pub const COMMENT_MARKER: char = '#';

/// A list line that failed validation
#[derive(Debug)]
pub struct RejectedEntry {
    /// 1-based line number in the list file
    pub line_number: usize,
    pub text: String,
    pub error: FetchError,
}

/// Parsed content of a list file
#[derive(Debug, Default)]
pub struct ListEntries {
    /// Valid references in file order
    pub references: Vec<SongReference>,

    /// Lines that were not valid song-details URLs
    pub rejected: Vec<RejectedEntry>,
}

/// Read and parse a list file
///
/// A missing, unreadable or non-UTF-8 file fails the whole run; invalid
/// lines only end up in `rejected`.
pub fn read_list_file(path: &Path) -> Result<ListEntries> {
    if !path.exists() {
        bail!("File not found at {}", path.display());
    }
    if path.is_dir() {
        bail!("Provided list is a directory, not a file: {}", path.display());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read list file {}", path.display()))?;

    let entries = parse_list(&contents);
    log::debug!(
        "List {}: {} valid, {} rejected",
        path.display(),
        entries.references.len(),
        entries.rejected.len()
    );
    Ok(entries)
}

/// Parse list contents, skipping blank lines and comments
pub fn parse_list(contents: &str) -> ListEntries {
    let mut entries = ListEntries::default();

    for (index, line) in contents.lines().enumerate() {
        let text = line.trim();
        if text.is_empty() || text.starts_with(COMMENT_MARKER) {
            continue;
        }

        match parse_entry(text) {
            Ok(reference) => entries.references.push(reference),
            Err(error) => {
                log::debug!("Rejected list line {}: {}", index + 1, error);
                entries.rejected.push(RejectedEntry {
                    line_number: index + 1,
                    text: text.to_string(),
                    error,
                });
            }
        }
    }

    entries
}

/// Validate one list line with the same rules as a command-line URL
fn parse_entry(text: &str) -> Result<SongReference, FetchError> {
    if has_scheme(text) || has_bare_song_prefix(text) {
        parse_song_url(text)
    } else {
        Err(FetchError::InvalidInputKind(text.to_string()))
    }
}
