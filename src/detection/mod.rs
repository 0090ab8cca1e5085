pub mod preprocessing;
pub mod contours;
pub mod candidates;
pub mod selection;
pub mod annotate;

use ab_glyph::FontVec;
use image::{DynamicImage, RgbImage};
use std::time::Instant;

use crate::config::DetectorConfig;
use crate::dashboard::{Dashboard, DashboardBuilder};
use crate::error::{DetectError, Result};
use crate::models::{Contour, PlateRect};
use crate::pipeline::{
    Step, StepRecorder, StepSink, STEP_BLUR, STEP_CLOSING, STEP_CONTOURS, STEP_EDGES,
    STEP_FINAL, STEP_FINAL_ALL, STEP_GRAYSCALE, STEP_PLATE_CROP,
};
use selection::{select_single, Selection};

pub const MSG_NO_PLATE: &str = "No plate detected.";
pub const MSG_AMBIGUOUS: &str = "Multiple possible plates detected. Please use Multi-Plate mode.";

const SINGLE_LABEL: &str = "Detected Plate";
const SINGLE_LABEL_SCALE: f32 = 24.0;
const MULTI_LABEL_SCALE: f32 = 21.0;

/// What a detection request concluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    NoPlate,
    SinglePlate(PlateRect),
    /// Several comparably large candidates; retry in multi-plate mode
    Ambiguous,
    MultiPlate(Vec<PlateRect>),
}

#[derive(Debug, Clone)]
pub struct SingleDetection {
    pub request_id: String,
    pub outcome: DetectionOutcome,
    pub steps: Vec<Step>,
    pub dashboard: Dashboard,
    pub message: String,
}

impl SingleDetection {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DetectionOutcome::SinglePlate(_))
    }

    /// Cropped plate, when one was selected
    pub fn plate_crop(&self) -> Option<&DynamicImage> {
        self.steps
            .iter()
            .find(|s| s.name == STEP_PLATE_CROP)
            .map(|s| &s.artifact)
    }
}

/// One plate found in multi-plate mode
#[derive(Debug, Clone)]
pub struct PlateRegion {
    /// 1-indexed, matches the "Plate {i}" label
    pub index: usize,
    pub rect: PlateRect,
    pub image: DynamicImage,
    pub locator: String,
}

#[derive(Debug, Clone)]
pub struct MultiDetection {
    pub request_id: String,
    pub outcome: DetectionOutcome,
    pub steps: Vec<Step>,
    pub dashboard: Dashboard,
    pub message: String,
    pub plate_regions: Vec<PlateRegion>,
}

impl MultiDetection {
    /// Multi mode treats an empty scene as a normal result
    pub fn is_success(&self) -> bool {
        true
    }
}

/// Edge/contour plate detector.
///
/// Holds only read-only settings, so one instance can serve any number of
/// concurrent requests.
pub struct PlateDetector {
    config: DetectorConfig,
    font: Option<FontVec>,
}

impl PlateDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let font = annotate::load_font(config.font_path.as_deref());
        if font.is_none() {
            log::warn!("no label font found; annotated images will have boxes only");
        }
        Ok(Self { config, font })
    }

    /// Find the single most plausible plate in `image`
    pub fn detect_single(
        &self,
        image: &DynamicImage,
        request_id: &str,
        sink: &mut dyn StepSink,
    ) -> Result<SingleDetection> {
        let started = Instant::now();
        let rgb = validate_input(image)?;
        let (width, height) = rgb.dimensions();

        let mut recorder = StepRecorder::new(request_id, sink);
        let contours = self.run_common(&rgb, &mut recorder)?;
        let candidates = candidates::filter_candidates(&contours, &self.config);

        let (outcome, plate, candidate_count, message) =
            match select_single(&candidates, self.config.dominance_ratio) {
                Selection::Empty => (DetectionOutcome::NoPlate, None, 0, MSG_NO_PLATE),
                Selection::Ambiguous { dominant } => {
                    log::debug!(
                        "[{}] {} of {} candidates are dominant",
                        request_id,
                        dominant,
                        candidates.len()
                    );
                    (DetectionOutcome::Ambiguous, None, candidates.len(), MSG_AMBIGUOUS)
                }
                Selection::Plate(i) => {
                    let rect = candidates[i].rect;
                    self.record_single_plate(&rgb, &rect, &mut recorder)?;
                    (DetectionOutcome::SinglePlate(rect), Some(rect), 1, "")
                }
            };

        let steps = recorder.into_steps();
        let dashboard = DashboardBuilder {
            request_id,
            width,
            height,
            started,
            total_contours: contours.len(),
            candidates: candidate_count,
            steps: &steps,
        }
        .single(plate.as_ref());

        log::info!(
            "[{}] single-plate detection: {:?} ({} contours, {} candidates, {:.3}s)",
            request_id,
            outcome,
            contours.len(),
            candidates.len(),
            dashboard.processing_time
        );

        Ok(SingleDetection {
            request_id: request_id.to_string(),
            outcome,
            steps,
            dashboard,
            message: message.to_string(),
        })
    }

    /// Report every candidate in `image` as a plate
    pub fn detect_multi(
        &self,
        image: &DynamicImage,
        request_id: &str,
        sink: &mut dyn StepSink,
    ) -> Result<MultiDetection> {
        let started = Instant::now();
        let rgb = validate_input(image)?;
        let (width, height) = rgb.dimensions();

        let mut recorder = StepRecorder::new(request_id, sink);
        let contours = self.run_common(&rgb, &mut recorder)?;
        let candidates = candidates::filter_candidates(&contours, &self.config);

        let t = Instant::now();
        let mut annotated = rgb.clone();
        let mut crops = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let index = i + 1;
            let rect = candidate.rect;
            crops.push((index, rect, DynamicImage::ImageRgb8(rect.crop(&rgb))));

            annotate::draw_plate_box(
                &mut annotated,
                &rect,
                self.config.plate_color,
                self.config.box_thickness,
            );
            if let Some(font) = &self.font {
                annotate::draw_label(
                    &mut annotated,
                    &rect,
                    &format!("Plate {}", index),
                    self.config.plate_color,
                    MULTI_LABEL_SCALE,
                    font,
                );
            }
        }
        recorder.record(STEP_FINAL_ALL, DynamicImage::ImageRgb8(annotated), t)?;

        let mut plate_regions = Vec::with_capacity(crops.len());
        for (index, rect, image) in crops {
            let locator = recorder.store_plate(index, &image)?;
            plate_regions.push(PlateRegion {
                index,
                rect,
                image,
                locator,
            });
        }

        let rects: Vec<PlateRect> = plate_regions.iter().map(|p| p.rect).collect();
        let steps = recorder.into_steps();
        let dashboard = DashboardBuilder {
            request_id,
            width,
            height,
            started,
            total_contours: contours.len(),
            candidates: candidates.len(),
            steps: &steps,
        }
        .multi(&rects);

        log::info!(
            "[{}] multi-plate detection: {} plates ({} contours, {:.3}s)",
            request_id,
            rects.len(),
            contours.len(),
            dashboard.processing_time
        );

        Ok(MultiDetection {
            request_id: request_id.to_string(),
            outcome: DetectionOutcome::MultiPlate(rects),
            steps,
            dashboard,
            message: String::new(),
            plate_regions,
        })
    }

    /// Stages shared by both modes; each one is timed on its own
    fn run_common(&self, rgb: &RgbImage, recorder: &mut StepRecorder<'_>) -> Result<Vec<Contour>> {
        let t = Instant::now();
        let gray = preprocessing::to_grayscale(rgb);
        recorder.record(STEP_GRAYSCALE, DynamicImage::ImageLuma8(gray.clone()), t)?;

        let t = Instant::now();
        let blurred = preprocessing::apply_blur(
            &gray,
            self.config.blur_kernel_size,
            self.config.effective_blur_sigma(),
        );
        recorder.record(STEP_BLUR, DynamicImage::ImageLuma8(blurred.clone()), t)?;

        let t = Instant::now();
        let edges =
            preprocessing::detect_edges(&blurred, self.config.canny_low, self.config.canny_high);
        recorder.record(STEP_EDGES, DynamicImage::ImageLuma8(edges.clone()), t)?;

        let t = Instant::now();
        let closed = preprocessing::close_gaps(&edges, self.config.morph_kernel_size);
        recorder.record(STEP_CLOSING, DynamicImage::ImageLuma8(closed.clone()), t)?;

        let t = Instant::now();
        let contours = contours::find_external_contours(&closed);
        let mut overlay = rgb.clone();
        annotate::draw_contours(&mut overlay, &contours, self.config.contour_color);
        recorder.record(STEP_CONTOURS, DynamicImage::ImageRgb8(overlay), t)?;

        log::debug!("found {} external contours", contours.len());
        Ok(contours)
    }

    fn record_single_plate(
        &self,
        rgb: &RgbImage,
        rect: &PlateRect,
        recorder: &mut StepRecorder<'_>,
    ) -> Result<()> {
        let t = Instant::now();
        let crop = rect.crop(rgb);
        recorder.record(STEP_PLATE_CROP, DynamicImage::ImageRgb8(crop), t)?;

        let t = Instant::now();
        let mut annotated = rgb.clone();
        annotate::draw_plate_box(
            &mut annotated,
            rect,
            self.config.plate_color,
            self.config.box_thickness,
        );
        if let Some(font) = &self.font {
            annotate::draw_label(
                &mut annotated,
                rect,
                SINGLE_LABEL,
                self.config.plate_color,
                SINGLE_LABEL_SCALE,
                font,
            );
        }
        recorder.record(STEP_FINAL, DynamicImage::ImageRgb8(annotated), t)
    }
}

/// Reject empty or non-color input before any stage runs
fn validate_input(image: &DynamicImage) -> Result<RgbImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(DetectError::EmptyImage { width, height });
    }

    let color = image.color();
    if color.channel_count() != 3 {
        return Err(DetectError::UnsupportedColor(color));
    }

    Ok(image.to_rgb8())
}
