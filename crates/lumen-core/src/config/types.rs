//! Sub-configuration structs with their defaults.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Root directory of the thumbnail cache
    pub cache_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("~/.lumen/cache/thumbnails"),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Largest width pre-generated during indexing; wider sizes are on-demand only
    pub size_precached: u32,

    /// Largest width that may be generated on demand
    pub size_uncached: u32,

    /// Allow on-demand generation of sizes that are not pre-cached
    pub uncached: bool,

    /// Resampling filter used for resizing
    pub filter: ResampleFilter,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size_precached: 2048,
            size_uncached: 7680,
            uncached: true,
            filter: ResampleFilter::Lanczos,
            jpeg_quality: 85,
        }
    }
}

/// Resampling filter names accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    /// Lanczos with window 3
    #[default]
    Lanczos,
    /// Catmull-Rom cubic
    Cubic,
    /// Bilinear
    Linear,
    /// Gaussian
    Gaussian,
    /// Nearest neighbor
    Nearest,
}

impl ResampleFilter {
    /// The `image` crate filter this name stands for.
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Lanczos => FilterType::Lanczos3,
            ResampleFilter::Cubic => FilterType::CatmullRom,
            ResampleFilter::Linear => FilterType::Triangle,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Nearest => FilterType::Nearest,
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of originals processed concurrently
    pub parallel_workers: usize,

    /// File extensions picked up by directory discovery
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
                "heic".to_string(),
                "heif".to_string(),
                "avif".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 200,
            max_image_dimension: 20000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
