use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyprintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid encoded data: {0}")]
    InvalidToken(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Layout error: {0}")]
    Layout(String),
    #[error("Failed to load image {reference}: {reason}")]
    ImageLoad { reference: String, reason: String },
    #[error("Image load timed out after {0:?}")]
    Timeout(Duration),
    #[error("Share code too large after {attempts} attempts ({bytes} bytes)")]
    QrCapacityExhausted { attempts: usize, bytes: usize },
    #[error("QR encoder failed: {0}")]
    QrEncoder(String),
    #[error("Session store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, KeyprintError>;

impl KeyprintError {
    /// Input validation errors are reported to the user inline; nothing was mutated.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            KeyprintError::InvalidInput(_)
                | KeyprintError::InvalidToken(_)
                | KeyprintError::InvalidPayload(_)
        )
    }
}

/// Offset in millimeters (x to the right, y downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct OffsetMm {
    pub x_mm: f32,
    pub y_mm: f32,
}

impl OffsetMm {
    pub const ZERO: OffsetMm = OffsetMm::new(0.0, 0.0);

    pub const fn new(x_mm: f32, y_mm: f32) -> Self {
        Self { x_mm, y_mm }
    }
}

/// Printer overscan compensation, applied around the sheet center
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PrintCalibration {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl PrintCalibration {
    pub const IDENTITY: PrintCalibration = PrintCalibration {
        scale_x: 1.0,
        scale_y: 1.0,
    };
}

impl Default for PrintCalibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}
