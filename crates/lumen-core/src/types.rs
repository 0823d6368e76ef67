//! Core data types exchanged with the engine.
//!
//! A `MediaDescriptor` goes in; an `EnsureReport` or a `Thumbnail` comes out.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::LimitsConfig;
use crate::error::{ThumbError, ThumbResult};
use crate::pipeline::hash::Hasher;
use crate::pipeline::metadata::MetadataExtractor;
use crate::pipeline::validate::Validator;

/// Identity and geometry of one original, as the caller knows it.
///
/// The engine only reads it; it is never mutated during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// BLAKE3 hex digest of the file bytes; the cache key
    pub content_hash: String,

    /// Location of the original
    pub source_path: PathBuf,

    /// EXIF orientation (1-8); other values are treated as 1
    pub orientation: u8,

    /// Stored pixel width, before orientation correction
    pub width: u32,

    /// Stored pixel height, before orientation correction
    pub height: u32,
}

impl MediaDescriptor {
    pub fn new(
        content_hash: impl Into<String>,
        source_path: impl Into<PathBuf>,
        orientation: u8,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            content_hash: content_hash.into(),
            source_path: source_path.into(),
            orientation,
            width,
            height,
        }
    }

    /// Build a descriptor by inspecting a file on disk.
    ///
    /// Validates size and header, hashes the bytes, reads the EXIF orientation
    /// and the pixel dimensions. Does not decode pixel data.
    pub fn probe(path: &Path, limits: &LimitsConfig) -> ThumbResult<Self> {
        Validator::new(limits.clone()).validate(path)?;

        let content_hash = Hasher::content_hash(path).map_err(|e| ThumbError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let orientation = MetadataExtractor::orientation(path).unwrap_or(1);
        let (width, height) =
            image::image_dimensions(path).map_err(|e| ThumbError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(Self {
            content_hash,
            source_path: path.to_path_buf(),
            orientation,
            width,
            height,
        })
    }

    /// Whether the orientation swaps width and height (orientations 5-8).
    pub fn is_transposed(&self) -> bool {
        matches!(self.orientation, 5..=8)
    }

    /// Width and height as displayed, after orientation correction.
    pub fn display_dimensions(&self) -> (u32, u32) {
        if self.is_transposed() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Short name for log lines.
    pub fn log_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.content_hash.clone())
    }
}

/// What happened to one size during an `ensure` pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SizeOutcome {
    /// Already on disk (or produced earlier in the same pass)
    Cached {
        /// Size whose file satisfies this one
        produced: String,
    },

    /// Newly written to the cache
    Generated {
        /// Size actually written; differs from the requested one on substitution
        produced: String,
    },

    /// Not produced because the source is too small
    Skipped { reason: String },

    /// Generation or cache write failed; retried on the next pass
    Failed { error: String },

    /// Generated on demand only
    Ineligible,
}

/// Per-size line of an `EnsureReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReport {
    /// Requested size name
    pub size: String,

    #[serde(flatten)]
    pub outcome: SizeOutcome,
}

/// Result of one `ensure` pass over a media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsureReport {
    /// Content hash of the original
    pub content_hash: String,

    /// Original file
    pub source_path: PathBuf,

    /// Number of cache files newly written
    pub generated: usize,

    /// Whether the full-resolution original was decoded
    pub decoded_original: bool,

    /// One entry per catalog size, in generation order
    pub sizes: Vec<SizeReport>,

    /// Wall time of the pass in milliseconds
    pub elapsed_ms: u64,
}

impl EnsureReport {
    /// Sizes that failed and will be retried.
    pub fn failures(&self) -> impl Iterator<Item = &SizeReport> {
        self.sizes
            .iter()
            .filter(|s| matches!(s.outcome, SizeOutcome::Failed { .. }))
    }

    pub fn outcome(&self, size: &str) -> Option<&SizeOutcome> {
        self.sizes.iter().find(|s| s.size == size).map(|s| &s.outcome)
    }
}

/// A single derivative served on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Size that was asked for
    pub requested: String,

    /// Size whose file is returned
    pub size: String,

    /// Cache file to stream
    pub path: PathBuf,

    /// Whether the file was written by this request
    pub generated: bool,
}

impl Thumbnail {
    /// Whether the smallest fitting size was served instead of the requested one.
    pub fn substituted(&self) -> bool {
        self.requested != self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dimensions_swap_for_rotated() {
        let upright = MediaDescriptor::new("abcd", "a.jpg", 1, 1600, 1200);
        assert_eq!(upright.display_dimensions(), (1600, 1200));

        for orientation in 5..=8 {
            let rotated = MediaDescriptor::new("abcd", "a.jpg", orientation, 1600, 1200);
            assert_eq!(rotated.display_dimensions(), (1200, 1600));
        }

        let unknown = MediaDescriptor::new("abcd", "a.jpg", 0, 1600, 1200);
        assert_eq!(unknown.display_dimensions(), (1600, 1200));
    }

    #[test]
    fn test_size_outcome_serializes_with_status_tag() {
        let report = SizeReport {
            size: "fit_2048".into(),
            outcome: SizeOutcome::Generated {
                produced: "fit_1280".into(),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["size"], "fit_2048");
        assert_eq!(json["status"], "generated");
        assert_eq!(json["produced"], "fit_1280");
    }

    #[test]
    fn test_thumbnail_substituted() {
        let thumb = Thumbnail {
            requested: "fit_2048".into(),
            size: "fit_720".into(),
            path: PathBuf::from("x.jpg"),
            generated: true,
        };
        assert!(thumb.substituted());
    }

    #[test]
    fn test_probe_reads_hash_and_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        image::RgbImage::new(30, 20).save(&path).unwrap();

        let descriptor = MediaDescriptor::probe(&path, &LimitsConfig::default()).unwrap();
        assert_eq!(descriptor.content_hash.len(), 64);
        assert_eq!((descriptor.width, descriptor.height), (30, 20));
        assert_eq!(descriptor.orientation, 1);
    }

    #[test]
    fn test_probe_missing_file() {
        let err = MediaDescriptor::probe(Path::new("/nonexistent/a.jpg"), &LimitsConfig::default())
            .unwrap_err();
        assert!(matches!(err, ThumbError::FileNotFound(_)));
    }
}
