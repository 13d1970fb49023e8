use crate::aoi::Aoi;
use crate::archive::{extract_archive, list_archives, Extraction};
use crate::cli::Args;
use crate::clip::clip_raster;
use crate::error::{PreprocessError, Result};
use crate::layout::{has_extension, sorted_entries, Layout};
use crate::mosaic::mosaic_directory;
use crate::options::OutputOptions;
use crate::report::{BatchReport, PeriodReport, RunReport, Stage};
use crate::scene::discover_scenes;
use crate::stack::stack_scene;
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub periods: Vec<String>,
    pub aoi_path: PathBuf,
    pub resolution_tier: String,
    pub band_extension: String,
    pub output: OutputOptions,
    pub extract: bool,
    pub fail_fast: bool,
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            periods: vec!["Past".to_string(), "Now".to_string()],
            aoi_path: PathBuf::from("aoi.shp"),
            resolution_tier: "20m".to_string(),
            band_extension: "jp2".to_string(),
            output: OutputOptions::default(),
            extract: true,
            fail_fast: false,
            parallel: false,
        }
    }
}

impl TryFrom<&Args> for Settings {
    type Error = PreprocessError;

    fn try_from(args: &Args) -> Result<Self> {
        let periods: Vec<String> = args
            .periods
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if periods.is_empty() {
            return Err(PreprocessError::InvalidInput("no period given".to_string()));
        }
        if let Some(bad) = periods
            .iter()
            .find(|p| p.contains(|c: char| c == '/' || c == '\\') || p.as_str() == "..")
        {
            return Err(PreprocessError::InvalidInput(format!(
                "period '{}' is not a plain folder name",
                bad
            )));
        }
        if args.resolution.trim().is_empty() {
            return Err(PreprocessError::InvalidInput(
                "empty resolution tier".to_string(),
            ));
        }

        Ok(Self {
            periods,
            aoi_path: args.aoi.clone(),
            resolution_tier: args.resolution.trim().to_string(),
            band_extension: args.band_extension.trim_start_matches('.').to_string(),
            output: OutputOptions::new(&args.compress, args.tile_size)?,
            extract: !args.skip_extract,
            fail_fast: args.fail_fast,
            parallel: args.parallel,
        })
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Record `result`, or hand the error back when failing fast
fn settle(
    batch: &mut BatchReport,
    item: &str,
    result: Result<PathBuf>,
    fail_fast: bool,
) -> Result<()> {
    match result {
        Err(e) if fail_fast => Err(e),
        other => {
            batch.record(item, other);
            Ok(())
        }
    }
}

fn extract_stage(downloads: &Path, settings: &Settings) -> Result<BatchReport> {
    let mut batch = BatchReport::new(Stage::Extract);
    for archive in list_archives(downloads)? {
        let item = file_label(&archive);
        match extract_archive(&archive) {
            Ok(Extraction::Extracted(_)) => batch.record_done(&item),
            Ok(Extraction::AlreadyPresent(dir)) => {
                batch.record_skip(&item, &format!("already extracted to {}", dir.display()))
            }
            Err(e) if settings.fail_fast => return Err(e),
            Err(e) => batch.record_failure(&item, &e.to_string()),
        }
    }
    Ok(batch)
}

fn stack_stage(downloads: &Path, export_dir: &Path, settings: &Settings) -> Result<BatchReport> {
    let mut batch = BatchReport::new(Stage::Stack);
    for scene in discover_scenes(downloads)? {
        let result = stack_scene(
            &scene,
            &settings.resolution_tier,
            &settings.band_extension,
            export_dir,
            &settings.output,
        );
        match result {
            Err(e) if settings.fail_fast => return Err(e),
            other => batch.record_optional(&scene.product_name, other, "no band files"),
        }
    }
    Ok(batch)
}

fn clip_stage(stacked_dir: &Path, clipped_dir: &Path, aoi: &Aoi, settings: &Settings) -> Result<BatchReport> {
    let mut batch = BatchReport::new(Stage::Clip);
    let rasters = sorted_entries(stacked_dir)?
        .into_iter()
        .filter(|p| p.is_file() && has_extension(p, "tif"));
    for raster in rasters {
        let result = clip_raster(&raster, aoi, clipped_dir, &settings.output);
        settle(&mut batch, &file_label(&raster), result, settings.fail_fast)?;
    }
    Ok(batch)
}

/// Extract, stack, clip and mosaic one period
pub fn run_period(period: &str, layout: &Layout, aoi: &Aoi, settings: &Settings) -> Result<PeriodReport> {
    let started = Instant::now();
    let mut report = PeriodReport::new(period);
    let downloads = layout.downloads(period);
    let stacked_dir = layout.stacked(period);
    let clipped_dir = layout.clipped(period);

    info!("=== Period {} ===", period);

    if settings.extract {
        report.stages.push(extract_stage(&downloads, settings)?);
    }
    report
        .stages
        .push(stack_stage(&downloads, &stacked_dir, settings)?);
    report
        .stages
        .push(clip_stage(&stacked_dir, &clipped_dir, aoi, settings)?);

    let mut mosaic = BatchReport::new(Stage::Mosaic);
    let result = mosaic_directory(&clipped_dir, &settings.output);
    settle(&mut mosaic, period, result, settings.fail_fast)?;
    report.stages.push(mosaic);

    report.elapsed = started.elapsed();
    Ok(report)
}

/// Run every configured period, sharing one AOI
pub fn run(layout: &Layout, settings: &Settings) -> Result<RunReport> {
    let started = Instant::now();

    layout.bootstrap(&settings.periods)?;
    let aoi = Aoi::load(&layout.resolve(&settings.aoi_path))?;

    let process = |period: &String| -> Result<PeriodReport> {
        match run_period(period, layout, &aoi, settings) {
            Err(e) if !settings.fail_fast => {
                warn!("Period {} aborted: {}", period, e);
                Ok(PeriodReport::aborted(period, &e.to_string()))
            }
            other => other,
        }
    };

    let periods = if settings.parallel {
        info!("Processing {} periods in parallel", settings.periods.len());
        settings
            .periods
            .par_iter()
            .map(process)
            .collect::<Result<Vec<_>>>()?
    } else {
        settings
            .periods
            .iter()
            .map(process)
            .collect::<Result<Vec<_>>>()?
    };

    Ok(RunReport {
        periods,
        elapsed: started.elapsed(),
    })
}
