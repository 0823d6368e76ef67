//! Error types for the Lumen thumbnail engine.
//!
//! Errors are organized by stage so callers can tell a fatal failure (the
//! original could not be opened) from one that only affects a single size.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Size catalog could not be built
    #[error("Size catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Thumbnail loading, generation or caching errors
    #[error("Thumbnail error: {0}")]
    Thumb(#[from] ThumbError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Size catalog validation errors. Raised once, when the catalog is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two sizes share a name
    #[error("Duplicate size name: {0}")]
    DuplicateName(String),

    /// A size has a zero width or height
    #[error("Size {name} has invalid dimensions {width}x{height}")]
    InvalidDimensions { name: String, width: u32, height: u32 },

    /// A size derives from a name that is not in the catalog
    #[error("Size {name} derives from unknown size {source_name}")]
    UnknownSource { name: String, source_name: String },

    /// A size derives from a smaller size
    #[error("Size {name} derives from {source_name}, which is smaller")]
    SourceTooSmall { name: String, source_name: String },

    /// Source references form a cycle
    #[error("Size sources form a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// Errors raised while loading, generating or caching thumbnails.
#[derive(Error, Debug)]
pub enum ThumbError {
    /// Original file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Reading the original failed
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes are not a valid image this engine recognizes
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Recognized format that this engine cannot decode
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Resizing or encoding a single size failed
    #[error("Failed to encode {size}: {message}")]
    Encode { size: String, message: String },

    /// Writing a cache file failed
    #[error("Failed to write {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content hash cannot be used as a cache key
    #[error("Content hash {0:?} is not a valid cache key")]
    InvalidHash(String),

    /// Size name is not in the catalog
    #[error("Unknown thumbnail size: {0}")]
    UnknownSize(String),

    /// Size exists but may not be served for this request
    #[error("Thumbnail {size} not available: {reason}")]
    NotAvailable { size: String, reason: String },

    /// The blocking task running a pass panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl ThumbError {
    /// Whether this error means the original could not be opened.
    ///
    /// Only these halt an `ensure` pass; everything else is isolated to one size.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ThumbError::FileNotFound(_)
                | ThumbError::Read { .. }
                | ThumbError::Decode { .. }
                | ThumbError::UnsupportedFormat { .. }
        )
    }
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, LumenError>;

/// Convenience type alias for thumbnail-stage results.
pub type ThumbResult<T> = std::result::Result<T, ThumbError>;
