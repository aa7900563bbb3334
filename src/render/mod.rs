//! PDF assembly from ordered page images
//!
//! The organizer only depends on the `PdfRenderer` trait, so tests can swap
//! in a recording renderer.

mod pdf;

pub use pdf::ImagePdfRenderer;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Renders an ordered list of page images into a single PDF
pub trait PdfRenderer {
    /// Write `pages` (in order, one per PDF page) to `output`
    fn render(&self, pages: &[PathBuf], output: &Path) -> Result<()>;
}
