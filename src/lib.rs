pub mod config;
pub mod dashboard;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;

pub use config::{load_config, DetectorConfig};
pub use dashboard::{ContourSummary, Dashboard, StepTime};
pub use detection::{
    DetectionOutcome, MultiDetection, PlateDetector, PlateRegion, SingleDetection,
};
pub use error::{DetectError, Result};
pub use models::{Candidate, Contour, PlateRect};
pub use pipeline::{DirectorySink, MemorySink, Step, StepSink, StoredArtifact};
