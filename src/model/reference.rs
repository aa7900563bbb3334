use crate::error::FetchError;

/// Canonical reference to one arrangement of one song
///
/// Built only from a validated song-details URL; fields are private so the
/// slugs can't change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongReference {
    song_slug: String,
    arrangement_slug: String,
    source_url: String,
}

impl SongReference {
    /// Create a reference, rejecting empty slugs
    pub fn new(
        song_slug: impl Into<String>,
        arrangement_slug: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let song_slug = song_slug.into();
        let arrangement_slug = arrangement_slug.into();
        let source_url = source_url.into();

        if song_slug.is_empty() || arrangement_slug.is_empty() {
            return Err(FetchError::invalid_song_url(
                source_url,
                "song and arrangement slugs must not be empty",
            ));
        }

        Ok(Self {
            song_slug,
            arrangement_slug,
            source_url,
        })
    }

    pub fn song_slug(&self) -> &str {
        &self.song_slug
    }

    pub fn arrangement_slug(&self) -> &str {
        &self.arrangement_slug
    }

    /// The normalized URL this reference was derived from
    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

impl std::fmt::Display for SongReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.song_slug, self.arrangement_slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_slugs() {
        assert!(SongReference::new("", "orchestration", "https://x").is_err());
        assert!(SongReference::new("way-maker", "", "https://x").is_err());
    }

    #[test]
    fn test_display() {
        let reference = SongReference::new("way-maker", "orchestration", "https://x").unwrap();
        assert_eq!(reference.to_string(), "way-maker/orchestration");
    }
}
