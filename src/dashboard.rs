use serde::Serialize;
use std::time::Instant;

use crate::models::PlateRect;
use crate::pipeline::{round_to, Step};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTime {
    pub name: String,
    pub ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContourSummary {
    pub total: usize,
    pub candidates: usize,
    pub plates: usize,
}

/// Per-request metrics, built once after the pipeline has finished
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub image_name: String,
    pub resolution: String,
    pub width: u32,
    pub height: u32,
    pub total_contours: usize,
    pub plate_candidates: usize,
    /// Only reported in multi-plate mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plates_detected: Option<usize>,
    /// Wall-clock seconds for the whole request
    pub processing_time: f64,
    pub plate_area_percent: f64,
    pub step_times: Vec<StepTime>,
    pub contour_data: ContourSummary,
}

/// Inputs gathered while the pipeline ran
pub(crate) struct DashboardBuilder<'a> {
    pub request_id: &'a str,
    pub width: u32,
    pub height: u32,
    pub started: Instant,
    pub total_contours: usize,
    pub candidates: usize,
    pub steps: &'a [Step],
}

impl DashboardBuilder<'_> {
    /// Single mode: at most one plate, area of that plate
    pub(crate) fn single(self, plate: Option<&PlateRect>) -> Dashboard {
        let percent = plate
            .map(|r| r.area_percent_of(self.width, self.height))
            .unwrap_or(0.0);
        let plates = usize::from(plate.is_some());
        self.build(percent, plates, None)
    }

    /// Multi mode: every plate counts, mean area ratio across them
    pub(crate) fn multi(self, plates: &[PlateRect]) -> Dashboard {
        let percent = if plates.is_empty() {
            0.0
        } else {
            plates
                .iter()
                .map(|r| r.area_percent_of(self.width, self.height))
                .sum::<f64>()
                / plates.len() as f64
        };
        self.build(percent, plates.len(), Some(plates.len()))
    }

    fn build(self, area_percent: f64, plates: usize, plates_detected: Option<usize>) -> Dashboard {
        Dashboard {
            image_name: format!("{}.png", self.request_id),
            resolution: format!("{}×{}", self.width, self.height),
            width: self.width,
            height: self.height,
            total_contours: self.total_contours,
            plate_candidates: self.candidates,
            plates_detected,
            processing_time: round_to(self.started.elapsed().as_secs_f64(), 3),
            plate_area_percent: round_to(area_percent, 2),
            step_times: self
                .steps
                .iter()
                .map(|s| StepTime {
                    name: s.name.clone(),
                    ms: s.elapsed_ms,
                })
                .collect(),
            contour_data: ContourSummary {
                total: self.total_contours,
                candidates: self.candidates,
                plates,
            },
        }
    }
}
