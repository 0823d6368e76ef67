//! The `lumen sizes` command: list the size catalog.

use clap::Args;
use lumen_core::config::ThumbnailConfig;
use lumen_core::{CropAnchor, ResizeMode, SizeCatalog, SizeSpec};
use serde::Serialize;

/// Arguments for the `sizes` command.
#[derive(Args, Debug)]
pub struct SizesArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

/// How a size is served under the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Availability {
    /// Pre-generated by `lumen thumbs`
    Cached,
    /// Generated on first request
    OnDemand,
    /// Never served
    Unavailable,
}

impl Availability {
    fn of(spec: &SizeSpec, config: &ThumbnailConfig) -> Self {
        if spec.cache_eligible {
            Availability::Cached
        } else if config.uncached && spec.width <= config.size_uncached {
            Availability::OnDemand
        } else {
            Availability::Unavailable
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Availability::Cached => "cached",
            Availability::OnDemand => "on demand",
            Availability::Unavailable => "unavailable",
        }
    }
}

#[derive(Serialize)]
struct SizeRow<'a> {
    #[serde(flatten)]
    spec: &'a SizeSpec,
    availability: Availability,
}

/// Execute the sizes command.
pub async fn execute(args: SizesArgs) -> anyhow::Result<()> {
    let config = lumen_core::Config::load()?;
    let catalog = SizeCatalog::standard(&config.thumbnails)?;

    let rows: Vec<SizeRow<'_>> = catalog
        .all_in_order()
        .map(|spec| SizeRow {
            spec,
            availability: Availability::of(spec, &config.thumbnails),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<10} {:>11}  {:<18} {:<10} {:<12} USAGE",
        "NAME", "BOX", "MODE", "SOURCE", "SERVED"
    );
    for row in &rows {
        println!(
            "{:<10} {:>11}  {:<18} {:<10} {:<12} {}",
            row.spec.name,
            format!("{}x{}", row.spec.width, row.spec.height),
            describe_mode(row.spec),
            row.spec.source.as_deref().unwrap_or("-"),
            row.availability.as_str(),
            row.spec.usage
        );
    }
    Ok(())
}

fn describe_mode(spec: &SizeSpec) -> &'static str {
    match (spec.mode, spec.anchor) {
        (ResizeMode::Fit, _) => "fit",
        (ResizeMode::Crop, CropAnchor::Center) => "crop",
        (ResizeMode::Crop, CropAnchor::TopLeft) => "crop, top-left",
        (ResizeMode::Crop, CropAnchor::BottomRight) => "crop, bottom-right",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability() {
        let config = ThumbnailConfig::default();
        let catalog = SizeCatalog::standard(&config).unwrap();
        let of = |name: &str| Availability::of(catalog.lookup(name).unwrap(), &config);

        assert_eq!(of("tile_50"), Availability::Cached);
        assert_eq!(of("fit_2048"), Availability::Cached);
        assert_eq!(of("fit_4096"), Availability::OnDemand);

        let strict = ThumbnailConfig {
            uncached: false,
            ..ThumbnailConfig::default()
        };
        let spec = catalog.lookup("fit_4096").unwrap();
        assert_eq!(Availability::of(spec, &strict), Availability::Unavailable);
    }

    #[test]
    fn test_describe_mode() {
        let catalog = SizeCatalog::standard(&ThumbnailConfig::default()).unwrap();
        assert_eq!(describe_mode(catalog.lookup("fit_720").unwrap()), "fit");
        assert_eq!(
            describe_mode(catalog.lookup("right_224").unwrap()),
            "crop, bottom-right"
        );
    }

    #[test]
    fn test_json_row_flattens_spec() {
        let spec = SizeSpec::crop("tile_50", 50, 50).from_source("tile_500");
        let row = SizeRow {
            spec: &spec,
            availability: Availability::Cached,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["name"], "tile_50");
        assert_eq!(json["source"], "tile_500");
        assert_eq!(json["availability"], "cached");
    }
}
