use anyhow::Context;
use clap::Parser;
use image::{DynamicImage, ImageReader};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use platescan::{
    load_config, Dashboard, DetectorConfig, DirectorySink, MemorySink, PlateDetector, Step,
    StepSink,
};

const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

#[derive(Parser)]
#[command(name = "platescan")]
#[command(about = "Locate license plates in images with an edge/contour heuristic")]
struct Cli {
    /// Input images (.jpg, .jpeg, .png, .bmp)
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Report every plausible plate instead of picking one
    #[arg(long)]
    multi: bool,

    /// Write step artifacts and plate crops to this directory
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// JSON file overriding detector thresholds
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print one JSON report per image
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct StepLink {
    name: String,
    url: String,
}

/// Per-image report, shaped like the upload response of the web front end
#[derive(Debug, Serialize)]
struct Report {
    image: String,
    success: bool,
    message: String,
    outcome: String,
    dashboard: Dashboard,
    steps: Vec<StepLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plates: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => DetectorConfig::default(),
    };
    let detector = Arc::new(PlateDetector::new(config)?);

    if let Some(dir) = &args.out {
        DirectorySink::new(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut failures = 0;
    for (path, result) in run_all(detector, &args.images, args.out.as_deref(), args.multi).await? {
        match result {
            Ok(report) => print_report(&report, args.json)?,
            Err(e) => {
                failures += 1;
                log::error!("{}: {:#}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, args.images.len());
    }
    Ok(())
}

/// Run every image on the blocking pool; results keep the input order
async fn run_all(
    detector: Arc<PlateDetector>,
    images: &[PathBuf],
    out: Option<&Path>,
    multi: bool,
) -> anyhow::Result<Vec<(PathBuf, anyhow::Result<Report>)>> {
    let mut handles = Vec::with_capacity(images.len());
    for path in images.iter().cloned() {
        let detector = Arc::clone(&detector);
        let out = out.map(Path::to_path_buf);
        // Detection is CPU-bound; keep it off the async workers
        handles.push(tokio::task::spawn_blocking(move || {
            process_image(&detector, &path, out.as_deref(), multi)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (path, handle) in images.iter().zip(handles) {
        results.push((path.clone(), handle.await?));
    }
    Ok(results)
}

fn process_image(
    detector: &PlateDetector,
    path: &Path,
    out: Option<&Path>,
    multi: bool,
) -> anyhow::Result<Report> {
    check_extension(path)?;

    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let request_id = new_request_id();
    log::debug!("{} -> request {} ({}x{})", path.display(), request_id, img.width(), img.height());

    let mut sink: Box<dyn StepSink> = match out {
        Some(dir) => Box::new(DirectorySink::new(dir)?),
        None => Box::new(MemorySink::new()),
    };

    let image = path.display().to_string();
    if multi {
        let result = detector.detect_multi(&img, &request_id, sink.as_mut())?;
        Ok(Report {
            image,
            success: result.is_success(),
            message: result.message,
            outcome: format!("{:?}", result.outcome),
            dashboard: result.dashboard,
            steps: step_links(&result.steps),
            plates: Some(result.plate_regions.into_iter().map(|p| p.locator).collect()),
        })
    } else {
        let result = detector.detect_single(&img, &request_id, sink.as_mut())?;
        Ok(Report {
            image,
            success: result.is_success(),
            message: result.message,
            outcome: format!("{:?}", result.outcome),
            dashboard: result.dashboard,
            steps: step_links(&result.steps),
            plates: None,
        })
    }
}

fn check_extension(path: &Path) -> anyhow::Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        anyhow::bail!("Unsupported file type: {}", path.display());
    }
    Ok(())
}

/// First 8 hex digits of a random UUID
fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn step_links(steps: &[Step]) -> Vec<StepLink> {
    steps
        .iter()
        .map(|s| StepLink {
            name: s.name.clone(),
            url: s.locator.clone(),
        })
        .collect()
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let dash = &report.dashboard;
    println!("\n=== {} ===", report.image);
    println!("Outcome: {}", report.outcome);
    if !report.message.is_empty() {
        println!("{}", report.message);
    }
    println!(
        "Resolution: {}  contours: {}  candidates: {}  plates: {}",
        dash.resolution,
        dash.total_contours,
        dash.plate_candidates,
        dash.contour_data.plates
    );
    println!(
        "Plate area: {:.2}%  processing time: {:.3}s",
        dash.plate_area_percent, dash.processing_time
    );
    for step in &dash.step_times {
        println!("  {:<30} {:>8.2} ms", step.name, step.ms);
    }
    if let Some(plates) = &report.plates {
        for (i, plate) in plates.iter().enumerate() {
            println!("  Plate {}: {}", i + 1, plate);
        }
    }
    Ok(())
}
