use image::ColorType;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DetectError>;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("expected a 3-channel color image, got {0:?}")]
    UnsupportedColor(ColorType),

    #[error("invalid detector config: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to store artifact `{name}`")]
    Sink {
        name: String,
        #[source]
        source: image::ImageError,
    },
}
