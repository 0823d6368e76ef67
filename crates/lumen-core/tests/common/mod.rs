//! Shared fixtures for the end-to-end thumbnail tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};
use lumen_core::config::{LimitsConfig, ThumbnailConfig};
use lumen_core::{
    ImageLoader, MediaDescriptor, SizeCatalog, SizeSpec, SourceLoader, ThumbCache, ThumbResult,
    Thumbnailer,
};

/// Loader that counts decodes of originals and of cached derivatives.
pub struct CountingLoader {
    inner: ImageLoader,
    opens: AtomicUsize,
    derivative_opens: AtomicUsize,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self {
            inner: ImageLoader::new(LimitsConfig::default()),
            opens: AtomicUsize::new(0),
            derivative_opens: AtomicUsize::new(0),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn derivative_opens(&self) -> usize {
        self.derivative_opens.load(Ordering::SeqCst)
    }
}

impl SourceLoader for CountingLoader {
    fn open(&self, descriptor: &MediaDescriptor) -> ThumbResult<DynamicImage> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open(descriptor)
    }

    fn open_derivative(&self, path: &Path) -> ThumbResult<DynamicImage> {
        self.derivative_opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open_derivative(path)
    }
}

/// Two fit sizes where `tiny` derives from `small`.
pub fn small_tiny_catalog() -> SizeCatalog {
    SizeCatalog::new(vec![
        SizeSpec::fit("small", 200, 200),
        SizeSpec::fit("tiny", 50, 50).from_source("small"),
    ])
    .unwrap()
}

/// Read the cache file of `size` for `media`.
pub fn cached_bytes(thumbnailer: &Thumbnailer, media: &MediaDescriptor, size: &str) -> Vec<u8> {
    let path = thumbnailer.cache().path(&media.content_hash, size).unwrap();
    std::fs::read(path).unwrap()
}

/// Write a patterned PNG and probe it into a descriptor.
pub fn photo(dir: &Path, name: &str, width: u32, height: u32) -> MediaDescriptor {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x ^ y) % 256) as u8])
    })
    .save(&path)
    .unwrap();
    MediaDescriptor::probe(&path, &LimitsConfig::default()).unwrap()
}

pub fn thumbnailer(
    catalog: SizeCatalog,
    root: &Path,
    loader: Arc<dyn SourceLoader>,
) -> Thumbnailer {
    Thumbnailer::with_parts(
        Arc::new(catalog),
        ThumbCache::new(root),
        loader,
        &ThumbnailConfig::default(),
    )
}
