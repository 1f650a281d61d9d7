//! Page-Mirror: save a web page together with the resources it embeds
//!
//! This crate fetches one HTML page, downloads the same-host stylesheets,
//! scripts and images it references into a sibling `<name>_files` directory,
//! and writes a copy of the page whose references point at those local files.

pub mod config;
pub mod html;
pub mod loader;
pub mod naming;
pub mod state;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for page loading
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl { url: String, source: UrlError },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTML parse error: {message}")]
    Parse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Resource task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::LoadState,
        to: state::LoadState,
    },
}

/// Coarse classification of a `LoadError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    Fetch,
    Filesystem,
    Parse,
    Config,
    Internal,
}

impl LoadError {
    /// Returns the kind of failure this error represents
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config(_) => ErrorKind::Config,
            Self::Client(_) | Self::Task(_) | Self::InvalidTransition { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn filesystem(path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// HTTP fetch failures, for the root page and for resources alike
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for page loading
pub type Result<T> = std::result::Result<T, LoadError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, FailurePolicy};
pub use loader::{FetchReport, LoadResult, PageLoader};
pub use naming::{name_for, NameRole};
pub use state::LoadState;

/// Mirrors the page at `url` into `output_dir` with the default configuration
///
/// Returns the path of the written HTML file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> page_mirror::Result<()> {
/// let result = page_mirror::load_page("https://site.com/blog/about", "/tmp/mirror").await?;
/// println!("{}", result.filepath.display());
/// # Ok(())
/// # }
/// ```
pub async fn load_page(url: &str, output_dir: impl AsRef<Path>) -> Result<LoadResult> {
    PageLoader::new(Config::default())?
        .load(url, output_dir)
        .await
}
