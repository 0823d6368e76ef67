//! Named derivative sizes.

use serde::{Deserialize, Serialize};

/// How a derivative is fitted into its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Scale and crop to exactly fill the box
    Crop,
    /// Scale to fit inside the box, never upscaling
    Fit,
}

/// Which part of the image survives a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropAnchor {
    #[default]
    Center,
    TopLeft,
    BottomRight,
}

/// One named derivative in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSpec {
    /// Unique name, also the cache file suffix (e.g. "tile_500")
    pub name: String,

    /// Box width in pixels
    pub width: u32,

    /// Box height in pixels
    pub height: u32,

    /// Crop to fill or fit inside
    pub mode: ResizeMode,

    /// Crop alignment; ignored in Fit mode
    pub anchor: CropAnchor,

    /// Pre-generated during indexing rather than on first request
    pub cache_eligible: bool,

    /// Another size this one is derived from instead of the original
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// What the size is used for
    #[serde(skip_serializing_if = "String::is_empty")]
    pub usage: String,
}

impl SizeSpec {
    /// A size that fits the image inside `width` x `height`.
    pub fn fit(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(name.into(), width, height, ResizeMode::Fit)
    }

    /// A size that crops the image to exactly `width` x `height`.
    pub fn crop(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(name.into(), width, height, ResizeMode::Crop)
    }

    fn new(name: String, width: u32, height: u32, mode: ResizeMode) -> Self {
        Self {
            name,
            width,
            height,
            mode,
            anchor: CropAnchor::Center,
            cache_eligible: true,
            source: None,
            usage: String::new(),
        }
    }

    /// Derive this size from `source` instead of the original.
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn anchored(mut self, anchor: CropAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn eligible(mut self, cache_eligible: bool) -> Self {
        self.cache_eligible = cache_eligible;
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Whether an image of `width` x `height` fits inside this box.
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }

    pub fn is_fit(&self) -> bool {
        self.mode == ResizeMode::Fit
    }

    /// Box area, used to order Fit sizes from small to large.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let spec = SizeSpec::crop("left_224", 224, 224)
            .from_source("fit_720")
            .anchored(CropAnchor::TopLeft)
            .eligible(false);
        assert_eq!(spec.mode, ResizeMode::Crop);
        assert_eq!(spec.source.as_deref(), Some("fit_720"));
        assert_eq!(spec.anchor, CropAnchor::TopLeft);
        assert!(!spec.cache_eligible);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let spec = SizeSpec::fit("fit_720", 720, 720);
        assert!(spec.contains(720, 720));
        assert!(spec.contains(100, 720));
        assert!(!spec.contains(721, 10));
    }

    #[test]
    fn test_serializes_mode_lowercase() {
        let json = serde_json::to_string(&SizeSpec::fit("fit_720", 720, 720)).unwrap();
        assert!(json.contains("\"mode\":\"fit\""));
        assert!(!json.contains("source"));
    }
}
