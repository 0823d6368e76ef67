//! The `lumen thumbs` command: pre-generate the thumbnail catalog for a library.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, ValueEnum};
use futures_util::stream::{self, StreamExt};
use lumen_core::{
    ensure_all, EnsureReport, FileDiscovery, MediaDescriptor, OutputFormat as CoreOutputFormat,
    OutputWriter, Thumbnailer,
};

/// Arguments for the `thumbs` command.
#[derive(Args, Debug)]
pub struct ThumbsArgs {
    /// Image file or directory of originals
    #[arg(required = true)]
    pub input: PathBuf,

    /// Regenerate sizes that are already cached
    #[arg(long)]
    pub force: bool,

    /// Number of parallel workers (defaults to processing.parallel_workers)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Cache directory (overrides general.cache_dir)
    #[arg(long, env = "LUMEN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Report file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,
}

/// Supported report formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Counters for the end-of-run summary.
#[derive(Debug, Default, PartialEq, Eq)]
struct RunStats {
    /// Originals whose pass completed
    succeeded: u64,
    /// Originals that could not be probed or opened
    failed: u64,
    /// Thumbnail files written
    generated: u64,
    /// Sizes that failed inside completed passes
    size_failures: u64,
    /// Passes that needed no decode at all
    fully_cached: u64,
}

impl RunStats {
    fn record(&mut self, report: &EnsureReport) {
        self.succeeded += 1;
        self.generated += report.generated as u64;
        self.size_failures += report.failures().count() as u64;
        if !report.decoded_original && report.generated == 0 {
            self.fully_cached += 1;
        }
    }
}

/// Execute the thumbs command.
pub async fn execute(args: ThumbsArgs) -> anyhow::Result<()> {
    let input = super::expand(&args.input);
    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            input
        );
    }

    let config = super::load_config(args.cache_dir.as_deref())?;
    let workers = args.parallel.unwrap_or(config.processing.parallel_workers);
    let thumbnailer = Arc::new(Thumbnailer::new(&config)?);
    tracing::info!("Thumbnail cache: {:?}", thumbnailer.cache().root());

    let files = FileDiscovery::new(config.processing.clone())
        .exclude(config.cache_dir())
        .discover(&input);
    if files.is_empty() {
        tracing::warn!("No supported images found at {:?}", input);
        return Ok(());
    }
    tracing::info!(
        "Found {} originals ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0
    );

    let start_time = Instant::now();
    let mut stats = RunStats::default();

    // Probe (hash + EXIF + dimensions) on the blocking pool
    let progress = create_progress_bar(files.len() as u64, "probing");
    let limits = config.limits.clone();
    let probed: Vec<_> = stream::iter(files)
        .map(|file| {
            let limits = limits.clone();
            tokio::task::spawn_blocking(move || {
                let result = MediaDescriptor::probe(&file.path, &limits);
                (file.path, result)
            })
        })
        .buffer_unordered(workers.max(1))
        .inspect(|_| progress.inc(1))
        .collect()
        .await;
    progress.finish_and_clear();

    let mut media = Vec::with_capacity(probed.len());
    for joined in probed {
        let (path, result) = joined?;
        match result {
            Ok(descriptor) => media.push(descriptor),
            Err(e) => {
                stats.failed += 1;
                tracing::error!("Failed: {:?} - {}", path, e);
            }
        }
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), args.output.is_none());

    let progress = create_progress_bar(media.len() as u64, "starting...");
    let mut results = std::pin::pin!(ensure_all(thumbnailer, media, workers, args.force));
    while let Some((descriptor, result)) = results.next().await {
        match result {
            Ok(report) => {
                stats.record(&report);
                writer.write(&report)?;
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!("Failed: {:?} - {}", descriptor.source_path, e);
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (stats.succeeded + stats.failed) as f64 / elapsed;
            progress.set_message(format!("{:.1} img/sec", rate));
        }
    }
    writer.finish()?;
    progress.finish_and_clear();

    if let Some(output_path) = &args.output {
        tracing::info!("Report written to {:?}", output_path);
    }
    print_summary(&stats, start_time.elapsed());

    Ok(())
}

fn create_progress_bar(total: u64, message: &'static str) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message(message);
    pb
}

/// Print a formatted summary table after a batch run.
fn print_summary(stats: &RunStats, elapsed: Duration) {
    let total = stats.succeeded + stats.failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Originals:    {:>8}", stats.succeeded);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    eprintln!("    Up to date:   {:>8}", stats.fully_cached);
    eprintln!("  ------------------------------------");
    eprintln!("    Thumbnails:   {:>8}", stats.generated);
    if stats.size_failures > 0 {
        eprintln!("    Size errors:  {:>8}", stats.size_failures);
    }
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
