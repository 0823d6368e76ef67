//! Thumbnail orchestration - wires the catalog, loader, generator and cache together.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;

use crate::config::{Config, ThumbnailConfig};
use crate::error::{Result, ThumbError, ThumbResult};
use crate::sizes::{ResizeMode, SizeCatalog, SizeSpec};
use crate::types::{EnsureReport, MediaDescriptor, SizeOutcome, SizeReport, Thumbnail};

use super::cache::ThumbCache;
use super::decode::{ImageLoader, SourceLoader};
use super::generate::Generator;

/// Produces and caches the derivative catalog of media items.
///
/// Holds no per-item state, so one instance is shared by all workers.
/// Concurrent calls for the same item are safe: generation is deterministic
/// and cache writes never clobber.
pub struct Thumbnailer {
    catalog: Arc<SizeCatalog>,
    cache: ThumbCache,
    generator: Generator,
    loader: Arc<dyn SourceLoader>,
    uncached: bool,
    size_uncached: u32,
}

/// Working state of one `ensure` or `thumbnail` call.
struct Pass<'a> {
    media: &'a MediaDescriptor,
    /// Upright original, decoded on first use
    original: Option<DynamicImage>,
    decoded_original: bool,
    /// Rasters produced this pass that other sizes derive from, by requested name
    rasters: HashMap<String, DynamicImage>,
    /// Cache keys already satisfied this pass
    produced: HashSet<String>,
}

impl<'a> Pass<'a> {
    fn new(media: &'a MediaDescriptor) -> Self {
        Self {
            media,
            original: None,
            decoded_original: false,
            rasters: HashMap::new(),
            produced: HashSet::new(),
        }
    }

    /// The decoded original; opened at most once per pass.
    fn original(&mut self, loader: &dyn SourceLoader) -> ThumbResult<&DynamicImage> {
        let image = match self.original.take() {
            Some(image) => image,
            None => {
                let image = loader.open(self.media)?;
                self.decoded_original = true;
                image
            }
        };
        let image: &DynamicImage = self.original.insert(image);
        Ok(image)
    }
}

impl Thumbnailer {
    /// Create a thumbnailer with the standard catalog and the image crate loader.
    pub fn new(config: &Config) -> Result<Self> {
        let catalog = SizeCatalog::standard(&config.thumbnails)?;
        Ok(Self::with_parts(
            Arc::new(catalog),
            ThumbCache::new(config.cache_dir()),
            Arc::new(ImageLoader::new(config.limits.clone())),
            &config.thumbnails,
        ))
    }

    /// Assemble a thumbnailer from explicit parts.
    pub fn with_parts(
        catalog: Arc<SizeCatalog>,
        cache: ThumbCache,
        loader: Arc<dyn SourceLoader>,
        config: &ThumbnailConfig,
    ) -> Self {
        Self {
            generator: Generator::new(catalog.clone(), config),
            catalog,
            cache,
            loader,
            uncached: config.uncached,
            size_uncached: config.size_uncached,
        }
    }

    pub fn catalog(&self) -> &SizeCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &ThumbCache {
        &self.cache
    }

    /// Make sure every cache-eligible size of `media` exists on disk.
    ///
    /// Sizes already cached are left alone unless `force` is set. The original
    /// is decoded at most once, and only if some size has to be produced from
    /// it. Failures of a single size are recorded in the report and do not
    /// stop the pass; only a failure to open the original is returned as an
    /// error.
    pub fn ensure(&self, media: &MediaDescriptor, force: bool) -> ThumbResult<EnsureReport> {
        let start = Instant::now();
        // Reject unusable cache keys before any work is done.
        self.cache.path(&media.content_hash, "")?;

        let mut pass = Pass::new(media);
        let mut sizes = Vec::with_capacity(self.catalog.len());
        let mut generated = 0;

        for spec in self.catalog.all_in_order() {
            let outcome = self.ensure_size(&mut pass, spec, force)?;
            if matches!(outcome, SizeOutcome::Generated { .. }) {
                generated += 1;
            }
            sizes.push(SizeReport {
                size: spec.name.clone(),
                outcome,
            });
        }

        if generated == 0 {
            tracing::debug!("{}: created no new thumbnails", media.log_name());
        } else {
            tracing::info!(
                "{}: created {} thumbnails [{:?}]",
                media.log_name(),
                generated,
                start.elapsed()
            );
        }

        Ok(EnsureReport {
            content_hash: media.content_hash.clone(),
            source_path: media.source_path.clone(),
            generated,
            decoded_original: pass.decoded_original,
            sizes,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn ensure_size(
        &self,
        pass: &mut Pass<'_>,
        spec: &SizeSpec,
        force: bool,
    ) -> ThumbResult<SizeOutcome> {
        if !spec.cache_eligible {
            return Ok(SizeOutcome::Ineligible);
        }

        let media = pass.media;
        let hash = media.content_hash.as_str();
        let (width, height) = media.display_dimensions();

        let key = self.generator.resolve(spec, width, height).name.as_str();
        if pass.produced.contains(key) || (!force && self.cache.exists(hash, key)) {
            tracing::trace!("{}: {} already cached as {}", media.log_name(), spec.name, key);
            return Ok(SizeOutcome::Cached {
                produced: key.to_string(),
            });
        }

        if too_small(spec, width, height) {
            tracing::debug!(
                "{}: skipped {}, source {}x{} is too small",
                media.log_name(),
                spec.name,
                width,
                height
            );
            return Ok(SizeOutcome::Skipped {
                reason: format!(
                    "source {}x{} is smaller than {}x{}",
                    width, height, spec.width, spec.height
                ),
            });
        }

        let start = Instant::now();
        let derivative = {
            let input = self.input(pass, spec)?;
            self.generator.generate(input, spec)
        };
        let derivative = match derivative {
            Ok(derivative) => derivative,
            Err(e) => {
                tracing::warn!("{}: failed to create {}: {}", media.log_name(), spec.name, e);
                return Ok(SizeOutcome::Failed {
                    error: e.to_string(),
                });
            }
        };

        let written = if force {
            self.cache
                .write(hash, &derivative.size, &derivative.bytes)
                .map(|()| true)
        } else {
            self.cache
                .write_if_absent(hash, &derivative.size, &derivative.bytes)
        };

        let produced = derivative.size.clone();
        if self.catalog.is_source(&spec.name) {
            pass.rasters.insert(spec.name.clone(), derivative.image);
        }

        match written {
            Ok(true) => {
                tracing::debug!(
                    "{}: created {} [{:?}]",
                    media.log_name(),
                    produced,
                    start.elapsed()
                );
                pass.produced.insert(produced.clone());
                Ok(SizeOutcome::Generated { produced })
            }
            Ok(false) => {
                pass.produced.insert(produced.clone());
                Ok(SizeOutcome::Cached { produced })
            }
            Err(e) => {
                tracing::warn!("{}: failed to cache {}: {}", media.log_name(), produced, e);
                Ok(SizeOutcome::Failed {
                    error: e.to_string(),
                })
            }
        }
    }

    /// Pick the raster to produce `spec` from.
    ///
    /// A size with a source is always cut from that source's pixels, which
    /// are rebuilt in memory when this pass did not produce them. Cached
    /// JPEGs are never used as input, so a size regenerated later comes out
    /// byte-identical to the first one.
    fn input<'p>(
        &self,
        pass: &'p mut Pass<'_>,
        spec: &SizeSpec,
    ) -> ThumbResult<&'p DynamicImage> {
        if let Some(source) = self.source_of(pass.media, spec) {
            if self.materialize(pass, source)? {
                return Ok(&pass.rasters[&source.name]);
            }
        }

        pass.original(self.loader.as_ref())
    }

    /// The source of `spec`, if a pass over `media` would render it.
    fn source_of(&self, media: &MediaDescriptor, spec: &SizeSpec) -> Option<&SizeSpec> {
        let source = self.catalog.lookup(spec.source.as_deref()?)?;
        let (width, height) = media.display_dimensions();
        (source.cache_eligible && !too_small(source, width, height)).then_some(source)
    }

    /// Render `spec` into `pass.rasters` unless it is already there.
    ///
    /// Returns false if the pixels cannot be produced; dependents then fall
    /// back to the original just as they do after a failed size.
    fn materialize(&self, pass: &mut Pass<'_>, spec: &SizeSpec) -> ThumbResult<bool> {
        if pass.rasters.contains_key(&spec.name) {
            return Ok(true);
        }

        let rendered = {
            let input = self.input(pass, spec)?;
            self.generator.render(input, spec)
        };
        match rendered {
            Ok((_, image)) => {
                tracing::trace!("{}: rebuilt {} in memory", pass.media.log_name(), spec.name);
                pass.rasters.insert(spec.name.clone(), image);
                Ok(true)
            }
            Err(e) => {
                tracing::debug!(
                    "{}: cannot rebuild {}: {}",
                    pass.media.log_name(),
                    spec.name,
                    e
                );
                Ok(false)
            }
        }
    }

    /// Serve one size, generating it if it is not cached yet.
    ///
    /// Sizes outside the cache-eligible set are produced on demand when
    /// `thumbnails.uncached` is enabled and their width is within
    /// `thumbnails.size_uncached`. A Fit size larger than the original is
    /// served as the smallest fitting size instead.
    pub fn thumbnail(&self, media: &MediaDescriptor, size: &str) -> ThumbResult<Thumbnail> {
        let spec = self
            .catalog
            .lookup(size)
            .ok_or_else(|| ThumbError::UnknownSize(size.to_string()))?;

        if !spec.cache_eligible {
            if !self.uncached {
                return Err(ThumbError::NotAvailable {
                    size: size.to_string(),
                    reason: "on-demand generation is disabled".to_string(),
                });
            }
            if spec.width > self.size_uncached {
                return Err(ThumbError::NotAvailable {
                    size: size.to_string(),
                    reason: format!(
                        "width {} exceeds the on-demand limit of {}",
                        spec.width, self.size_uncached
                    ),
                });
            }
        }

        let hash = media.content_hash.as_str();
        let (width, height) = media.display_dimensions();
        let target = self.generator.resolve(spec, width, height);
        let path = self.cache.path(hash, &target.name)?;
        if path.is_file() {
            return Ok(Thumbnail {
                requested: size.to_string(),
                size: target.name.clone(),
                path,
                generated: false,
            });
        }

        let mut pass = Pass::new(media);
        let derivative = {
            let input = self.input(&mut pass, spec)?;
            self.generator.generate(input, spec)?
        };
        let generated = self
            .cache
            .write_if_absent(hash, &derivative.size, &derivative.bytes)?;
        let path = self.cache.path(hash, &derivative.size)?;

        if derivative.substituted() {
            tracing::debug!(
                "{}: served {} as {} (generated: {})",
                media.log_name(),
                size,
                derivative.size,
                generated
            );
        } else {
            tracing::debug!(
                "{}: served {} (generated: {})",
                media.log_name(),
                size,
                generated
            );
        }

        Ok(Thumbnail {
            requested: derivative.requested,
            size: derivative.size,
            path,
            generated,
        })
    }
}

/// Crop sizes are skipped when their box exceeds the source in both dimensions.
fn too_small(spec: &SizeSpec, width: u32, height: u32) -> bool {
    spec.mode == ResizeMode::Crop && spec.width > width && spec.height > height
}
