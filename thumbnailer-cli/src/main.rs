use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use thumbnailer::{BoundingBox, LocalStore, Pipeline, RecordSelection, S3Event, ThumbnailConfig};

#[derive(Parser)]
#[command(name = "thumbnailer-cli")]
#[command(
    about = "Create a thumbnail for an object-created notification against a local object store",
    long_about = None
)]
#[command(version)]
struct Args {
    /// Notification JSON file; `-` or omitted reads stdin
    #[arg(value_name = "EVENT")]
    event: Option<PathBuf>,

    /// Object store root, one directory per bucket
    #[arg(short, long, value_name = "DIR")]
    store: PathBuf,

    /// JSON config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bounding box width
    #[arg(long, value_name = "PIXELS")]
    max_width: Option<u32>,

    /// Bounding box height
    #[arg(long, value_name = "PIXELS")]
    max_height: Option<u32>,

    /// Process every record in the notification, not only the first
    #[arg(long, default_value_t)]
    all_records: bool,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (no diagnostics)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose, args.quiet);

    if !args.store.is_dir() {
        anyhow::bail!("Store root is not a directory: {}", args.store.display());
    }

    let config = build_config(&args)?;
    let event = read_event(&args)?;

    let pipeline = Pipeline::new(LocalStore::new(&args.store), config);

    match pipeline.handle(&event) {
        Ok(invocation) => {
            println!("{}", invocation.result());
            Ok(())
        }
        Err(e) if e.terminates_process() => {
            log::error!("{e}");
            std::process::exit(1);
        }
        Err(e) => {
            let stage = e.stage();
            Err(anyhow::Error::new(e).context(format!("Thumbnail failed after stage `{stage}`")))
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<ThumbnailConfig> {
    let mut config = match &args.config {
        Some(path) => ThumbnailConfig::load(path)?,
        None => ThumbnailConfig::default(),
    };

    if args.max_width.is_some() || args.max_height.is_some() {
        config.bounding_box = BoundingBox::new(
            args.max_width.unwrap_or(config.bounding_box.width),
            args.max_height.unwrap_or(config.bounding_box.height),
        )?;
    }

    if args.all_records {
        config.records = RecordSelection::All;
    }

    log::debug!("Using config: {config:?}");
    Ok(config)
}

fn read_event(args: &Args) -> Result<S3Event> {
    match &args.event {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event {}", path.display()))?;
            S3Event::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse event {}", path.display()))
        }
        _ => S3Event::from_reader(io::stdin().lock()).context("Failed to parse event from stdin"),
    }
}
