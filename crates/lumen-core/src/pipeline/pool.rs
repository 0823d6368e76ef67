//! Bounded concurrent `ensure` over many media items.
//!
//! Each pass runs on tokio's blocking pool, since decoding, resizing and file
//! I/O are all synchronous. At most `workers` passes are in flight; results
//! are yielded as they complete, not in input order.

use std::sync::Arc;

use futures_util::stream::{self, Stream, StreamExt};

use crate::error::{ThumbError, ThumbResult};
use crate::types::{EnsureReport, MediaDescriptor};

use super::processor::Thumbnailer;

/// Run `ensure` for every descriptor with at most `workers` passes at once.
///
/// `workers == 0` is treated as 1. Dropping the stream stops scheduling new
/// passes; passes already running finish in the background.
pub fn ensure_all(
    thumbnailer: Arc<Thumbnailer>,
    media: Vec<MediaDescriptor>,
    workers: usize,
    force: bool,
) -> impl Stream<Item = (MediaDescriptor, ThumbResult<EnsureReport>)> {
    let workers = workers.max(1);

    stream::iter(media)
        .map(move |descriptor| {
            let thumbnailer = thumbnailer.clone();
            async move {
                let task_descriptor = descriptor.clone();
                let result = tokio::task::spawn_blocking(move || {
                    thumbnailer.ensure(&task_descriptor, force)
                })
                .await
                .unwrap_or_else(|e| {
                    tracing::error!(
                        "Thumbnail task for {:?} failed: {}",
                        descriptor.source_path,
                        e
                    );
                    Err(ThumbError::Worker(e.to_string()))
                });
                (descriptor, result)
            }
        })
        .buffer_unordered(workers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitsConfig, ThumbnailConfig};
    use crate::pipeline::cache::ThumbCache;
    use crate::pipeline::decode::ImageLoader;
    use crate::sizes::SizeCatalog;
    use image::{Rgb, RgbImage};

    fn thumbnailer(root: &std::path::Path) -> Arc<Thumbnailer> {
        let config = ThumbnailConfig::default();
        Arc::new(Thumbnailer::with_parts(
            Arc::new(SizeCatalog::standard(&config).unwrap()),
            ThumbCache::new(root.join("cache")),
            Arc::new(ImageLoader::new(LimitsConfig::default())),
            &config,
        ))
    }

    fn photo(dir: &std::path::Path, name: &str, shade: u8) -> MediaDescriptor {
        let path = dir.join(name);
        RgbImage::from_fn(320, 240, |x, y| Rgb([shade, (x % 256) as u8, (y % 256) as u8]))
            .save(&path)
            .unwrap();
        MediaDescriptor::probe(&path, &LimitsConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_all_yields_every_item() {
        let dir = tempfile::tempdir().unwrap();
        let media: Vec<_> = (0..5)
            .map(|i| photo(dir.path(), &format!("p{}.png", i), i * 40))
            .collect();
        let thumbnailer = thumbnailer(dir.path());

        let results: Vec<_> = ensure_all(thumbnailer.clone(), media.clone(), 2, false)
            .collect()
            .await;

        assert_eq!(results.len(), 5);
        for (descriptor, result) in &results {
            let report = result.as_ref().unwrap();
            assert_eq!(report.content_hash, descriptor.content_hash);
            assert!(report.generated > 0);
        }

        // Second run over the same items finds everything cached
        let again: Vec<_> = ensure_all(thumbnailer, media, 2, false).collect().await;
        assert!(again
            .iter()
            .all(|(_, r)| r.as_ref().map(|r| r.generated == 0).unwrap_or(false)));
    }

    #[tokio::test]
    async fn test_zero_workers_still_progresses() {
        let dir = tempfile::tempdir().unwrap();
        let media = vec![photo(dir.path(), "a.png", 10)];

        let results: Vec<_> = ensure_all(thumbnailer(dir.path()), media, 0, false)
            .collect()
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_ok());
    }

    #[tokio::test]
    async fn test_failures_are_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let good = photo(dir.path(), "good.png", 200);
        let mut missing = good.clone();
        missing.source_path = dir.path().join("missing.png");
        missing.content_hash = "0123456789abcdef".into();

        let results: Vec<_> = ensure_all(thumbnailer(dir.path()), vec![missing, good], 2, false)
            .collect()
            .await;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        assert_eq!(failed, 1);
        let (descriptor, result) = results.iter().find(|(_, r)| r.is_err()).unwrap();
        assert!(descriptor.source_path.ends_with("missing.png"));
        assert!(matches!(result, Err(ThumbError::FileNotFound(_))));
    }
}
