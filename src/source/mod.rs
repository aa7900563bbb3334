//! Page sources: discovering and fetching preview page images
//!
//! The pipeline only talks to the `PageSource` trait. `HttpPageSource` is
//! the bundled implementation; tests use in-memory fakes.

mod http;

pub use http::{extract_image_sources, HttpPageSource};

use crate::error::FetchError;
use crate::model::SongReference;
use std::path::Path;

/// A preview page found on a song page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPage {
    /// Instrument part the page belongs to
    pub instrument: String,

    /// File name the page is saved under
    pub file_name: String,

    /// Where to fetch the image from
    pub url: String,
}

/// Access to song pages and their preview images
pub trait PageSource {
    /// Whether the song page redirects to the site root (or is missing),
    /// meaning the song doesn't exist
    fn leads_to_site_root(&self, reference: &SongReference) -> bool;

    /// List all preview pages of an arrangement
    fn discover_pages(&self, reference: &SongReference) -> Result<Vec<DiscoveredPage>, FetchError>;

    /// Save one page image at `destination`
    fn fetch(&self, page: &DiscoveredPage, destination: &Path) -> Result<(), FetchError>;
}
