//! Download orchestration

pub mod config;
pub mod pipeline;

pub use config::RunConfig;
pub use pipeline::{DownloadPipeline, RunStatus};
