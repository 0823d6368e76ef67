//! The `lumen thumb` command: serve one size of one original.

use std::path::PathBuf;

use clap::Args;
use lumen_core::{MediaDescriptor, Thumbnailer};

/// Arguments for the `thumb` command.
#[derive(Args, Debug)]
pub struct ThumbArgs {
    /// Original image file
    #[arg(required = true)]
    pub file: PathBuf,

    /// Size name from `lumen sizes`, e.g. fit_720 or tile_224
    #[arg(required = true)]
    pub size: String,

    /// Cache directory (overrides general.cache_dir)
    #[arg(long, env = "LUMEN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Execute the thumb command.
///
/// Prints the resulting thumbnail (path, produced size, whether it was
/// generated now) as JSON on stdout.
pub async fn execute(args: ThumbArgs) -> anyhow::Result<()> {
    let file = super::expand(&args.file);
    if !file.is_file() {
        anyhow::bail!("Not a file: {:?}", file);
    }

    let config = super::load_config(args.cache_dir.as_deref())?;
    let thumbnailer = Thumbnailer::new(&config)?;
    let limits = config.limits.clone();
    let size = args.size;

    let thumbnail = tokio::task::spawn_blocking(move || {
        let media = MediaDescriptor::probe(&file, &limits)?;
        thumbnailer.thumbnail(&media, &size)
    })
    .await??;

    if thumbnail.substituted() {
        tracing::info!(
            "{} is larger than the original, serving {}",
            thumbnail.requested,
            thumbnail.size
        );
    }
    println!("{}", lumen_core::output::to_json(&thumbnail, true)?);
    Ok(())
}
