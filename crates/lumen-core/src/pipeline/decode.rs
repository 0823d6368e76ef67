//! Source image loading with format detection, validation, and orientation.

use image::{DynamicImage, GenericImageView, ImageError};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{ThumbError, ThumbResult};
use crate::types::MediaDescriptor;

use super::validate::Validator;

/// Opens rasters for the thumbnail pipeline.
///
/// Implementations must be deterministic: the same file yields the same pixels.
pub trait SourceLoader: Send + Sync {
    /// Decode the original and rotate/flip it upright per its orientation.
    fn open(&self, descriptor: &MediaDescriptor) -> ThumbResult<DynamicImage>;

    /// Decode a cached derivative. Derivatives are stored upright.
    fn open_derivative(&self, path: &Path) -> ThumbResult<DynamicImage>;
}

/// Decoder for originals backed by the `image` crate.
pub struct ImageLoader {
    limits: LimitsConfig,
    validator: Validator,
}

impl ImageLoader {
    /// Create a new loader with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            limits,
        }
    }

    fn read(path: &Path) -> ThumbResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ThumbError::FileNotFound(path.to_path_buf()),
            _ => ThumbError::Read {
                path: path.to_path_buf(),
                source: e,
            },
        })
    }

    /// Decode bytes whose header has already been validated.
    fn decode_bytes(&self, bytes: Vec<u8>, path: &Path) -> ThumbResult<DynamicImage> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ThumbError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;

        let Some(format) = reader.format() else {
            return Err(ThumbError::Decode {
                path: path.to_path_buf(),
                message: "Cannot detect image format".to_string(),
            });
        };

        let image = reader.decode().map_err(|e| match e {
            ImageError::Unsupported(_) => ThumbError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: format!("{:?}", format).to_lowercase(),
            },
            other => ThumbError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;

        let (width, height) = image.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(ThumbError::Decode {
                path: path.to_path_buf(),
                message: format!(
                    "Image too large ({}x{} > {})",
                    width, height, self.limits.max_image_dimension
                ),
            });
        }

        Ok(image)
    }
}

impl SourceLoader for ImageLoader {
    fn open(&self, descriptor: &MediaDescriptor) -> ThumbResult<DynamicImage> {
        let path = descriptor.source_path.as_path();
        let start = std::time::Instant::now();

        let bytes = Self::read(path)?;
        self.validator.validate_bytes(path, &bytes)?;
        let image = self.decode_bytes(bytes, path)?;
        let image = apply_orientation(image, descriptor.orientation);

        tracing::debug!(
            "Opened {:?} ({}x{}, orientation {}) in {:?}",
            path,
            image.width(),
            image.height(),
            descriptor.orientation,
            start.elapsed()
        );
        Ok(image)
    }

    fn open_derivative(&self, path: &Path) -> ThumbResult<DynamicImage> {
        let bytes = Self::read(path)?;
        self.validator.validate_bytes(path, &bytes)?;
        self.decode_bytes(bytes, path)
    }
}

/// Rotate and flip `image` so that EXIF `orientation` becomes upright.
pub fn apply_orientation(image: DynamicImage, orientation: u8) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
