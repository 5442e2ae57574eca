//! Error types for Feedmark
//!
//! This module provides the error type hierarchy using `thiserror`.
//! Extraction itself never fails outward: malformed URLs, missing metadata
//! and empty pages degrade to fewer or plainer records. The errors here cover
//! the plumbing around the engine (browser, store, transport, MCP).

use thiserror::Error;

/// The main error type for Feedmark operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// MCP protocol errors
    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    /// Snapshot and extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Reading list storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page is not one of the platform's timeline pages
    #[error("Please navigate to {platform} first! ({url})")]
    NotPlatformPage {
        /// Human-readable platform name
        platform: String,
        /// The rejected page URL
        url: String,
    },

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Snapshot errors raised by page sources
///
/// The orchestrator logs these and carries on with an empty document.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Could not read the rendered document
    #[error("Snapshot failed: {0}")]
    SnapshotFailed(String),

    /// Could not scroll the page
    #[error("Scroll failed: {0}")]
    ScrollFailed(String),
}

/// Delivery failure between the extractor and the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The receiving side of the record channel is gone
    #[error("record channel closed")]
    ChannelClosed,
}

/// Reading list storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Export requested with no records
    #[error("No URLs to export!")]
    Empty,

    /// Store file could not be read or written
    #[error("Store file {path}: {source}")]
    File {
        /// Path of the store file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Store file holds invalid JSON
    #[error("Corrupt store file {path}: {source}")]
    Corrupt {
        /// Path of the store file
        path: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable holds an unusable value
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
}

/// Result type alias for Feedmark operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}
