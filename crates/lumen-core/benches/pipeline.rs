//! Benchmarks for the Lumen thumbnail pipeline.
//!
//! Run with: cargo bench -p lumen-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use lumen_core::config::{LimitsConfig, ThumbnailConfig};
use lumen_core::pipeline::{Generator, Hasher, ImageLoader, SourceLoader, ThumbCache};
use lumen_core::{MediaDescriptor, SizeCatalog, Thumbnailer};
use std::sync::Arc;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn benchmark_content_hash(c: &mut Criterion) {
    let data = vec![0x5Au8; 8 * 1024 * 1024];

    c.bench_function("content_hash_blake3_8mb", |b| {
        b.iter(|| {
            let _ = Hasher::content_hash_from_bytes(black_box(&data));
        })
    });
}

fn benchmark_generate(c: &mut Criterion) {
    let config = ThumbnailConfig::default();
    let catalog = Arc::new(SizeCatalog::standard(&config).unwrap());
    let generator = Generator::new(catalog.clone(), &config);
    let source = gradient(1920, 1080);

    for size in ["fit_720", "tile_500", "tile_50"] {
        let spec = catalog.lookup(size).unwrap().clone();
        c.bench_function(&format!("generate_{}", size), |b| {
            b.iter(|| {
                let _ = generator.generate(black_box(&source), &spec);
            })
        });
    }
}

fn benchmark_open_derivative(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fit_720.jpg");
    gradient(720, 405).save(&path).unwrap();
    let loader = ImageLoader::new(LimitsConfig::default());

    c.bench_function("open_derivative_720", |b| {
        b.iter(|| {
            let _ = loader.open_derivative(black_box(&path));
        })
    });
}

fn benchmark_cached_ensure(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    gradient(1600, 1200).save(&path).unwrap();
    let media = MediaDescriptor::probe(&path, &LimitsConfig::default()).unwrap();

    let config = ThumbnailConfig::default();
    let thumbnailer = Thumbnailer::with_parts(
        Arc::new(SizeCatalog::standard(&config).unwrap()),
        ThumbCache::new(dir.path().join("cache")),
        Arc::new(ImageLoader::new(LimitsConfig::default())),
        &config,
    );
    thumbnailer.ensure(&media, false).unwrap();

    c.bench_function("ensure_fully_cached", |b| {
        b.iter(|| {
            let _ = thumbnailer.ensure(black_box(&media), false);
        })
    });
}

criterion_group!(
    benches,
    benchmark_content_hash,
    benchmark_generate,
    benchmark_open_derivative,
    benchmark_cached_ensure,
);
criterion_main!(benches);
