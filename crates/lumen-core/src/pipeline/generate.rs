//! Derivative generation: resize or crop a raster and encode it as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;

use crate::config::ThumbnailConfig;
use crate::error::{ThumbError, ThumbResult};
use crate::sizes::{CropAnchor, ResizeMode, SizeCatalog, SizeSpec};

/// File extension of every cache entry.
pub const THUMB_EXTENSION: &str = "jpg";

/// One produced derivative, ready to be cached.
pub struct Derivative {
    /// Size that was asked for
    pub requested: String,
    /// Size actually produced; the cache key to write under
    pub size: String,
    /// Produced pixels, reusable as input for derived sizes
    pub image: DynamicImage,
    /// Encoded JPEG
    pub bytes: Vec<u8>,
}

impl Derivative {
    /// Whether the smallest fitting size was produced instead of the requested one.
    pub fn substituted(&self) -> bool {
        self.requested != self.size
    }
}

/// Produces derivatives for catalog sizes.
///
/// Output depends only on the input pixels, the size and the configured
/// filter and quality, so regenerating a size yields identical bytes.
pub struct Generator {
    catalog: Arc<SizeCatalog>,
    filter: FilterType,
    quality: u8,
}

impl Generator {
    /// Create a new generator with the given configuration.
    pub fn new(catalog: Arc<SizeCatalog>, config: &ThumbnailConfig) -> Self {
        Self {
            catalog,
            filter: config.filter.filter_type(),
            quality: config.jpeg_quality,
        }
    }

    /// The size actually produced when `spec` is requested for a `width` x `height` source.
    ///
    /// A Fit size whose box already contains the source would have to upscale;
    /// the smallest Fit size that contains the source is produced instead.
    pub fn resolve<'a>(&'a self, spec: &'a SizeSpec, width: u32, height: u32) -> &'a SizeSpec {
        if spec.is_fit() && spec.contains(width, height) {
            self.catalog.smallest_fitting(width, height).unwrap_or(spec)
        } else {
            spec
        }
    }

    /// Produce `spec` from `source`.
    pub fn generate(&self, source: &DynamicImage, spec: &SizeSpec) -> ThumbResult<Derivative> {
        let (target, image) = self.render(source, spec)?;
        let bytes = self.encode(&image, &target.name)?;

        Ok(Derivative {
            requested: spec.name.clone(),
            size: target.name.clone(),
            image,
            bytes,
        })
    }

    /// The pixels `generate` would encode, along with the size they belong to.
    pub fn render<'a>(
        &'a self,
        source: &DynamicImage,
        spec: &'a SizeSpec,
    ) -> ThumbResult<(&'a SizeSpec, DynamicImage)> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(ThumbError::Encode {
                size: spec.name.clone(),
                message: format!("source has degenerate dimensions {}x{}", width, height),
            });
        }

        let target = self.resolve(spec, width, height);
        if target.name != spec.name {
            tracing::trace!(
                "Smallest fitting size for {}x{} is {} (requested {})",
                width,
                height,
                target.name,
                spec.name
            );
        }

        let image = match target.mode {
            ResizeMode::Fit => self.fit(source, target),
            ResizeMode::Crop => self.fill(source, target),
        };
        Ok((target, image))
    }

    /// Scale to fit inside the box; never upscales.
    fn fit(&self, source: &DynamicImage, spec: &SizeSpec) -> DynamicImage {
        let (width, height) = source.dimensions();
        if spec.contains(width, height) {
            return source.clone();
        }
        source.resize(spec.width, spec.height, self.filter)
    }

    /// Scale to cover the box, then cut the box out at the anchor.
    fn fill(&self, source: &DynamicImage, spec: &SizeSpec) -> DynamicImage {
        let (width, height) = source.dimensions();
        let ratio = f64::max(
            f64::from(spec.width) / f64::from(width),
            f64::from(spec.height) / f64::from(height),
        );
        let scaled_width = ((f64::from(width) * ratio).round() as u32).max(spec.width);
        let scaled_height = ((f64::from(height) * ratio).round() as u32).max(spec.height);

        let scaled = if (scaled_width, scaled_height) == (width, height) {
            source.clone()
        } else {
            source.resize_exact(scaled_width, scaled_height, self.filter)
        };

        let (x, y) = match spec.anchor {
            CropAnchor::Center => (
                (scaled_width - spec.width) / 2,
                (scaled_height - spec.height) / 2,
            ),
            CropAnchor::TopLeft => (0, 0),
            CropAnchor::BottomRight => (scaled_width - spec.width, scaled_height - spec.height),
        };
        scaled.crop_imm(x, y, spec.width, spec.height)
    }

    fn encode(&self, image: &DynamicImage, size: &str) -> ThumbResult<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ThumbError::Encode {
                size: size.to_string(),
                message: "result has zero width or height".to_string(),
            });
        }

        let rgb = image.to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality)
            .encode_image(&rgb)
            .map_err(|e| ThumbError::Encode {
                size: size.to_string(),
                message: e.to_string(),
            })?;
        Ok(bytes)
    }
}
