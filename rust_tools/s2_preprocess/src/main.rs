use clap::Parser;
use env_logger::Env;
use log::{error, info};

use s2_preprocess::cli::Args;
use s2_preprocess::error::{PreprocessError, Result};
use s2_preprocess::{pipeline, Layout, Settings};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("=== Sentinel-2 pre-processing ===");

    // Set thread pool size if specified
    if let Some(n_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build_global()
            .map_err(|e| PreprocessError::InvalidInput(format!("thread pool: {}", e)))?;
        info!("Using {} threads", n_threads);
    }

    let settings = Settings::try_from(&args)?;
    let layout = Layout::new(&args.root);

    info!("Working directory: {}", layout.root().display());
    info!(
        "Periods: {:?}, band tier: R{}, AOI: {}",
        settings.periods,
        settings.resolution_tier,
        settings.aoi_path.display()
    );

    let report = pipeline::run(&layout, &settings)?;
    report.log_summary();

    if report.has_failures() {
        error!("{} item(s) failed", report.failed_count());
        std::process::exit(1);
    }

    info!("=== Done! ===");
    Ok(())
}
