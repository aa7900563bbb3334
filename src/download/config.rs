//! Run configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default output root, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "charts";

/// Extension that marks an input as a URL list file
pub const DEFAULT_LIST_EXTENSION: &str = "txt";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/125.0 Safari/537.36 praisecharts-downloader/",
    env!("CARGO_PKG_VERSION")
);

/// Configuration for one download run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root under which `song/arrangement` directories are created
    pub output_root: PathBuf,

    /// Extension (without the dot) that identifies list files
    pub list_extension: String,

    /// Timeout for page and image downloads
    pub http_timeout: Duration,

    /// Timeout for the existence probe of a song page
    pub probe_timeout: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl RunConfig {
    /// Create a configuration writing below `output_root`
    pub fn new(output_root: PathBuf) -> Self {
        Self {
            output_root,
            list_extension: DEFAULT_LIST_EXTENSION.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the download timeout
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set the probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.output_root, PathBuf::from("charts"));
        assert_eq!(config.list_extension, "txt");
        assert_eq!(config.http_timeout, Duration::from_secs(20));
        assert!(config.user_agent.contains("praisecharts-downloader/"));
    }

    #[test]
    fn test_builders() {
        let config = RunConfig::new(PathBuf::from("/tmp/out"))
            .with_http_timeout(Duration::from_secs(5))
            .with_probe_timeout(Duration::from_secs(1));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
    }
}
