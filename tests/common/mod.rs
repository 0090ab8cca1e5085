mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from platescan for tests
#[allow(unused_imports)]
pub use platescan::{
    Candidate, DetectionOutcome, DetectorConfig, MemorySink, PlateDetector, PlateRect,
};
