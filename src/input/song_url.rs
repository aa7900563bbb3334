//! Song-details URL normalization and slug extraction

use crate::error::FetchError;
use crate::model::SongReference;
use url::Url;

/// Host the song-details pages live on (subdomains included)
pub const SITE_DOMAIN: &str = "praisecharts.com";

/// Path segment every song-details page contains
pub const SONG_DETAILS_SEGMENT: &str = "/songs/details/";

/// Scheme-less prefixes accepted as URLs (https is assumed)
const BARE_PREFIXES: [&str; 2] = [
    "www.praisecharts.com/songs/details/",
    "praisecharts.com/songs/details/",
];

/// Arrangement slug used when the URL stops after the song segment
const DEFAULT_ARRANGEMENT: &str = "default";

const SHEET_MUSIC_SUFFIX: &str = "-sheet-music";

/// Whether the input explicitly names an http(s) URL
pub fn has_scheme(raw: &str) -> bool {
    let lower = raw.trim().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Whether the input is a bare-domain song-details path
pub fn has_bare_song_prefix(raw: &str) -> bool {
    let lower = raw.trim().to_ascii_lowercase();
    BARE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Trim the input, prepend `https://` when no scheme is present and make
/// sure the result parses with a host
///
/// Returns `None` for empty input, embedded whitespace or unparsable URLs.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate).ok()?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Some(candidate),
        _ => None,
    }
}

fn is_site_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == SITE_DOMAIN || host.ends_with(&format!(".{}", SITE_DOMAIN))
}

/// Whether a URL points at a song-details page on the site
pub fn is_song_details_url(raw: &str) -> bool {
    normalize_url(raw)
        .and_then(|normalized| Url::parse(&normalized).ok())
        .map(|url| {
            url.host_str().map(is_site_host).unwrap_or(false)
                && url.path().contains(SONG_DETAILS_SEGMENT)
        })
        .unwrap_or(false)
}

/// Validate a URL and derive its song reference
///
/// The path looks like `/songs/details/<id>/<song>-sheet-music/<arrangement>`:
/// the song slug is the segment following the first all-digit segment with
/// `-sheet-music` removed, the arrangement slug is the one after it.
pub fn parse_song_url(raw: &str) -> Result<SongReference, FetchError> {
    let normalized =
        normalize_url(raw).ok_or_else(|| FetchError::invalid_song_url(raw.trim(), "not a URL"))?;

    if !is_song_details_url(&normalized) {
        return Err(FetchError::invalid_song_url(
            normalized,
            "expected something like 'praisecharts.com/songs/details/...'",
        ));
    }

    let url = Url::parse(&normalized)
        .map_err(|e| FetchError::invalid_song_url(normalized.clone(), e.to_string()))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let id_index = segments
        .iter()
        .position(|segment| segment.chars().all(|c| c.is_ascii_digit()))
        .ok_or_else(|| FetchError::invalid_song_url(normalized.clone(), "missing song id"))?;

    let song_segment = segments
        .get(id_index + 1)
        .ok_or_else(|| FetchError::invalid_song_url(normalized.clone(), "missing song segment"))?;

    let song_slug = decode_slug(&normalized, song_segment)?;
    let song_slug = song_slug
        .strip_suffix(SHEET_MUSIC_SUFFIX)
        .unwrap_or(&song_slug)
        .to_string();

    let arrangement_slug = match segments.get(id_index + 2) {
        Some(segment) => decode_slug(&normalized, segment)?,
        None => DEFAULT_ARRANGEMENT.to_string(),
    };

    SongReference::new(song_slug, arrangement_slug, normalized)
}

/// Percent-decode a path segment and make sure it is a single path component
fn decode_slug(url: &str, segment: &str) -> Result<String, FetchError> {
    let decoded = urlencoding::decode(segment)
        .map_err(|e| FetchError::invalid_song_url(url, format!("bad path encoding: {}", e)))?
        .into_owned();

    if decoded == "." || decoded == ".." || decoded.contains(['/', '\\']) {
        return Err(FetchError::invalid_song_url(
            url,
            format!("unsafe path segment '{}'", decoded),
        ));
    }

    Ok(decoded)
}
