use image::{DynamicImage, ImageResult};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{DetectError, Result};

pub const STEP_GRAYSCALE: &str = "Grayscale";
pub const STEP_BLUR: &str = "Gaussian Blur";
pub const STEP_EDGES: &str = "Edge Detection";
pub const STEP_CLOSING: &str = "Morphological Closing";
pub const STEP_CONTOURS: &str = "Contours Detected";
pub const STEP_PLATE_CROP: &str = "Plate Crop";
pub const STEP_FINAL: &str = "Final Annotated";
pub const STEP_FINAL_ALL: &str = "Final Annotated (All Plates)";

/// One named, timed visualization produced by a pipeline stage
#[derive(Debug, Clone)]
pub struct Step {
    /// 1-indexed position in the pipeline
    pub index: usize,
    pub name: String,
    pub artifact: DynamicImage,
    pub elapsed_ms: f64,
    /// Opaque reference returned by the sink
    pub locator: String,
}

/// Receives artifacts as the pipeline produces them.
///
/// The detector never touches the filesystem itself; whatever persistence
/// the host wants happens behind this trait.
pub trait StepSink {
    fn store_step(
        &mut self,
        request_id: &str,
        index: usize,
        name: &str,
        image: &DynamicImage,
    ) -> ImageResult<String>;

    fn store_plate(
        &mut self,
        request_id: &str,
        plate_index: usize,
        image: &DynamicImage,
    ) -> ImageResult<String>;
}

/// Record of something handed to a [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub request_id: String,
    pub name: String,
    pub locator: String,
    pub width: u32,
    pub height: u32,
}

/// Sink that keeps only a log of what it was given
#[derive(Debug, Default)]
pub struct MemorySink {
    pub stored: Vec<StoredArtifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, request_id: &str, name: String, locator: String, image: &DynamicImage) {
        self.stored.push(StoredArtifact {
            request_id: request_id.to_string(),
            name,
            locator,
            width: image.width(),
            height: image.height(),
        });
    }
}

impl StepSink for MemorySink {
    fn store_step(
        &mut self,
        request_id: &str,
        index: usize,
        name: &str,
        image: &DynamicImage,
    ) -> ImageResult<String> {
        let locator = format!("mem://{}/{}", request_id, index);
        self.push(request_id, name.to_string(), locator.clone(), image);
        Ok(locator)
    }

    fn store_plate(
        &mut self,
        request_id: &str,
        plate_index: usize,
        image: &DynamicImage,
    ) -> ImageResult<String> {
        let locator = format!("mem://{}/plate/{}", request_id, plate_index);
        self.push(request_id, format!("Plate {}", plate_index), locator.clone(), image);
        Ok(locator)
    }
}

/// Sink writing every artifact as a PNG into one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
}

impl DirectorySink {
    /// Use `output_dir`, creating it if it does not exist
    pub fn new(output_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn save(&self, filename: String, image: &DynamicImage) -> ImageResult<String> {
        let path = self.output_dir.join(filename);
        image.save(&path)?;
        Ok(path.display().to_string())
    }
}

impl StepSink for DirectorySink {
    fn store_step(
        &mut self,
        request_id: &str,
        index: usize,
        name: &str,
        image: &DynamicImage,
    ) -> ImageResult<String> {
        self.save(
            format!("{}_{}_{}.png", request_id, index, file_stem(name)),
            image,
        )
    }

    fn store_plate(
        &mut self,
        request_id: &str,
        plate_index: usize,
        image: &DynamicImage,
    ) -> ImageResult<String> {
        self.save(format!("{}_plate_{}.png", request_id, plate_index), image)
    }
}

/// "Final Annotated (All Plates)" -> "Final_Annotated_All_Plates"
fn file_stem(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Collects steps for a single request and forwards them to the sink
pub(crate) struct StepRecorder<'a> {
    request_id: &'a str,
    sink: &'a mut dyn StepSink,
    steps: Vec<Step>,
}

impl<'a> StepRecorder<'a> {
    pub(crate) fn new(request_id: &'a str, sink: &'a mut dyn StepSink) -> Self {
        Self {
            request_id,
            sink,
            steps: Vec::new(),
        }
    }

    /// Append a step whose work began at `started`. Sink time is not counted.
    pub(crate) fn record(&mut self, name: &str, artifact: DynamicImage, started: Instant) -> Result<()> {
        let elapsed_ms = round_to(started.elapsed().as_secs_f64() * 1000.0, 2);
        let index = self.steps.len() + 1;
        let locator = self
            .sink
            .store_step(self.request_id, index, name, &artifact)
            .map_err(|source| DetectError::Sink {
                name: name.to_string(),
                source,
            })?;

        log::debug!("[{}] step {} '{}' took {:.2} ms", self.request_id, index, name, elapsed_ms);

        self.steps.push(Step {
            index,
            name: name.to_string(),
            artifact,
            elapsed_ms,
            locator,
        });
        Ok(())
    }

    pub(crate) fn store_plate(&mut self, plate_index: usize, image: &DynamicImage) -> Result<String> {
        self.sink
            .store_plate(self.request_id, plate_index, image)
            .map_err(|source| DetectError::Sink {
                name: format!("Plate {}", plate_index),
                source,
            })
    }

    pub(crate) fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
