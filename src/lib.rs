//! PraiseCharts Downloader - sheet-music preview downloader
//!
//! This library turns song-details URLs (or lists of them) into download
//! targets on disk, resolves collisions with earlier downloads, and builds
//! one PDF per instrument from the saved preview pages.

pub mod console;
pub mod download;
pub mod error;
pub mod input;
pub mod model;
pub mod organize;
pub mod render;
pub mod resolve;
pub mod source;

pub use download::config::RunConfig;
pub use download::pipeline::{DownloadPipeline, RunStatus};
pub use error::FetchError;
