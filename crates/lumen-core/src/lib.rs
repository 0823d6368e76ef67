//! Lumen Core - Embeddable thumbnail derivation and caching engine.
//!
//! Given an original image, Lumen produces a fixed catalog of resized and
//! cropped JPEG derivatives and keeps them in a content-addressed cache, so
//! that every later request for the same derivative is a file lookup.
//!
//! # Architecture
//!
//! ```text
//! MediaDescriptor → Size Catalog → Cache hit? ──yes──→ path
//!                                      │ no
//!                                      ▼
//!                 Loader (once) → Generator → Cache (atomic write)
//! ```
//!
//! Sizes may derive from other sizes (`tile_224` from `tile_500`), so a pass
//! decodes the original at most once and skips it entirely when everything
//! it needs is already cached.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{Config, MediaDescriptor, Thumbnailer};
//!
//! fn main() -> lumen_core::Result<()> {
//!     let config = Config::load()?;
//!     let thumbnailer = Thumbnailer::new(&config)?;
//!
//!     let media = MediaDescriptor::probe("./photo.jpg".as_ref(), &config.limits)?;
//!     let report = thumbnailer.ensure(&media, false)?;
//!     println!("created {} thumbnails", report.generated);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod sizes;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{CatalogError, ConfigError, LumenError, Result, ThumbError, ThumbResult};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    ensure_all, DiscoveredFile, FileDiscovery, ImageLoader, SourceLoader, ThumbCache, Thumbnailer,
};
pub use sizes::{CropAnchor, ResizeMode, SizeCatalog, SizeSpec};
pub use types::{EnsureReport, MediaDescriptor, SizeOutcome, SizeReport, Thumbnail};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_thumbnailer_from_default_config() {
        let thumbnailer = Thumbnailer::new(&Config::default()).unwrap();
        assert_eq!(thumbnailer.catalog().len(), 14);
        assert!(thumbnailer.cache().root().ends_with("thumbnails"));
    }
}
