//! Validated, dependency-ordered size catalog.

use std::collections::{HashMap, HashSet};

use crate::config::ThumbnailConfig;
use crate::error::CatalogError;

use super::spec::{CropAnchor, SizeSpec};

/// Immutable set of derivative sizes.
///
/// Built once at startup. Construction validates every size and computes a
/// generation order in which each size's `source` precedes it.
#[derive(Debug, Clone)]
pub struct SizeCatalog {
    /// Sizes in declaration order
    sizes: Vec<SizeSpec>,
    /// Indices into `sizes`, in generation order
    order: Vec<usize>,
    index: HashMap<String, usize>,
    sources: HashSet<String>,
}

impl SizeCatalog {
    /// Validate `sizes` and compute their generation order.
    pub fn new(sizes: Vec<SizeSpec>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(sizes.len());
        for (i, spec) in sizes.iter().enumerate() {
            if spec.width == 0 || spec.height == 0 {
                return Err(CatalogError::InvalidDimensions {
                    name: spec.name.clone(),
                    width: spec.width,
                    height: spec.height,
                });
            }
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateName(spec.name.clone()));
            }
        }

        let mut sources = HashSet::new();
        for spec in &sizes {
            let Some(source_name) = &spec.source else {
                continue;
            };
            let source = index
                .get(source_name)
                .map(|&i| &sizes[i])
                .ok_or_else(|| CatalogError::UnknownSource {
                    name: spec.name.clone(),
                    source_name: source_name.clone(),
                })?;
            if source.width < spec.width || source.height < spec.height {
                return Err(CatalogError::SourceTooSmall {
                    name: spec.name.clone(),
                    source_name: source_name.clone(),
                });
            }
            sources.insert(source_name.clone());
        }

        let order = generation_order(&sizes, &index)?;

        Ok(Self {
            sizes,
            order,
            index,
            sources,
        })
    }

    /// The built-in catalog, with cache eligibility taken from `config`.
    pub fn standard(config: &ThumbnailConfig) -> Result<Self, CatalogError> {
        let sizes = vec![
            SizeSpec::fit("fit_7680", 7680, 4320).with_usage("8K Ultra HD, Retina 6K"),
            SizeSpec::fit("fit_4096", 4096, 4096).with_usage("Ultra HD, Retina 4K"),
            SizeSpec::fit("fit_3840", 3840, 2400)
                .from_source("fit_7680")
                .with_usage("Ultra HD"),
            SizeSpec::fit("fit_2560", 2560, 1600)
                .from_source("fit_4096")
                .with_usage("Quad HD, Retina Display"),
            SizeSpec::fit("fit_2048", 2048, 2048).with_usage("Tablets, Cinema 2K"),
            SizeSpec::fit("fit_1920", 1920, 1200)
                .from_source("fit_2048")
                .with_usage("Mobile, Full HD TV"),
            SizeSpec::fit("fit_1280", 1280, 1024)
                .from_source("fit_2048")
                .with_usage("Mobile, HD Ready TV"),
            SizeSpec::fit("fit_720", 720, 720).with_usage("Mobile, TV"),
            SizeSpec::crop("right_224", 224, 224)
                .from_source("fit_720")
                .anchored(CropAnchor::BottomRight)
                .with_usage("Classification, right crop"),
            SizeSpec::crop("left_224", 224, 224)
                .from_source("fit_720")
                .anchored(CropAnchor::TopLeft)
                .with_usage("Classification, left crop"),
            SizeSpec::crop("tile_500", 500, 500).with_usage("Cards View"),
            SizeSpec::crop("tile_224", 224, 224)
                .from_source("tile_500")
                .with_usage("Mosaic View"),
            SizeSpec::crop("tile_100", 100, 100)
                .from_source("tile_500")
                .with_usage("Places View"),
            SizeSpec::crop("tile_50", 50, 50)
                .from_source("tile_500")
                .with_usage("List View"),
        ];

        let sizes = sizes
            .into_iter()
            .map(|spec| {
                let eligible = spec.width <= config.size_precached;
                spec.eligible(eligible)
            })
            .collect();

        Self::new(sizes)
    }

    pub fn lookup(&self, name: &str) -> Option<&SizeSpec> {
        self.index.get(name).map(|&i| &self.sizes[i])
    }

    /// All sizes in generation order: every `source` comes before its dependents.
    pub fn all_in_order(&self) -> impl Iterator<Item = &SizeSpec> + '_ {
        self.order.iter().map(move |&i| &self.sizes[i])
    }

    /// Whether `name` is pre-generated during indexing. Unknown names are not.
    pub fn eligible(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|spec| spec.cache_eligible)
    }

    /// Whether any size is derived from `name`.
    pub fn is_source(&self, name: &str) -> bool {
        self.sources.contains(name)
    }

    /// The smallest Fit size whose box contains `width` x `height`.
    ///
    /// Ties on area are broken by width, then by declaration order.
    pub fn smallest_fitting(&self, width: u32, height: u32) -> Option<&SizeSpec> {
        self.sizes
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.is_fit() && spec.contains(width, height))
            .min_by_key(|(i, spec)| (spec.area(), spec.width, *i))
            .map(|(_, spec)| spec)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Stable topological sort over `source` edges.
///
/// Each size has at most one source, so among the sizes that are ready the
/// earliest declared one is emitted next.
fn generation_order(
    sizes: &[SizeSpec],
    index: &HashMap<String, usize>,
) -> Result<Vec<usize>, CatalogError> {
    let mut emitted = vec![false; sizes.len()];
    let mut order = Vec::with_capacity(sizes.len());

    while order.len() < sizes.len() {
        let next = sizes.iter().enumerate().position(|(i, spec)| {
            !emitted[i]
                && spec
                    .source
                    .as_ref()
                    .and_then(|s| index.get(s))
                    .map_or(true, |&src| emitted[src])
        });

        match next {
            Some(i) => {
                emitted[i] = true;
                order.push(i);
            }
            None => {
                let start = emitted
                    .iter()
                    .position(|done| !done)
                    .unwrap_or_default();
                return Err(CatalogError::Cycle(find_cycle(sizes, index, start)));
            }
        }
    }

    Ok(order)
}

/// Follow `source` edges from `start` until a size repeats; return the loop.
fn find_cycle(sizes: &[SizeSpec], index: &HashMap<String, usize>, start: usize) -> Vec<String> {
    let mut path: Vec<usize> = Vec::new();
    let mut current = start;

    loop {
        if let Some(pos) = path.iter().position(|&i| i == current) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|&i| sizes[i].name.clone())
                .collect();
            cycle.push(sizes[current].name.clone());
            return cycle;
        }
        path.push(current);

        match sizes[current].source.as_ref().and_then(|s| index.get(s)) {
            Some(&next) => current = next,
            None => return path.iter().map(|&i| sizes[i].name.clone()).collect(),
        }
    }
}
