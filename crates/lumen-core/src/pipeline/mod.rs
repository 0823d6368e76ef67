//! Thumbnail pipeline components.
//!
//! - **validate**: Header and size checks before decoding
//! - **decode**: Load originals and cached derivatives, apply orientation
//! - **hash**: Content hashes used as cache keys
//! - **metadata**: EXIF orientation lookup
//! - **generate**: Resize or crop one size and encode it
//! - **cache**: Content-addressed derivative storage
//! - **processor**: Walks the size catalog for one media item
//! - **pool**: Bounded concurrent processing of many items
//! - **discovery**: Find originals in directories

pub mod cache;
pub mod decode;
pub mod discovery;
pub mod generate;
pub mod hash;
pub mod metadata;
pub mod pool;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use cache::ThumbCache;
pub use decode::{apply_orientation, ImageLoader, SourceLoader};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use generate::{Derivative, Generator, THUMB_EXTENSION};
pub use hash::Hasher;
pub use metadata::MetadataExtractor;
pub use pool::ensure_all;
pub use processor::Thumbnailer;
pub use validate::{HeaderKind, Validator};
