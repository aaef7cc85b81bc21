use crate::raster::{RasterFormat, RasterOptions};
use crate::share::{QR_V40_L_BYTES, QrImageEncoder};
use crate::specs::{EXPORT_NUDGE, PRINT_CALIBRATION};
use crate::types::*;
use crate::units::DEFAULT_DPI;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Kiosk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskOptions {
    /// Export resolution
    pub dpi: u32,

    /// Origin share links point at, e.g. `https://kiosk.example`
    pub app_origin: String,

    /// Image proxy endpoint; relative paths resolve against `app_origin`
    pub proxy_endpoint: Option<String>,

    /// Bound on every image load during export
    pub image_timeout_secs: u64,

    // Export output
    pub export_format: RasterFormat,
    pub jpeg_quality: u8,
    pub draw_guides: bool,

    // Printer compensation
    pub apply_print_calibration: bool,
    pub calibration: PrintCalibration,
    pub export_nudge: OffsetMm,

    /// Largest share link accepted by the QR encoder
    pub qr_capacity_bytes: usize,
}

impl Default for KioskOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            app_origin: "http://localhost:8080".to_string(),
            proxy_endpoint: Some("/api/proxy".to_string()),
            image_timeout_secs: 15,
            export_format: RasterFormat::Png,
            jpeg_quality: 92,
            draw_guides: true,
            apply_print_calibration: false,
            calibration: PRINT_CALIBRATION,
            export_nudge: EXPORT_NUDGE,
            qr_capacity_bytes: QR_V40_L_BYTES,
        }
    }
}

impl KioskOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| KeyprintError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| KeyprintError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !(72..=1200).contains(&self.dpi) {
            return Err(KeyprintError::Config(format!(
                "DPI must be between 72 and 1200, got {}",
                self.dpi
            )));
        }

        self.origin()?;
        self.proxy_url()?;

        if self.image_timeout_secs == 0 {
            return Err(KeyprintError::Config(
                "Image timeout must be at least one second".to_string(),
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(KeyprintError::Config(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        let cal = self.calibration;
        if !(0.5..=1.5).contains(&cal.scale_x) || !(0.5..=1.5).contains(&cal.scale_y) {
            return Err(KeyprintError::Config(
                "Calibration scale must be between 0.5 and 1.5".to_string(),
            ));
        }

        Ok(())
    }

    pub fn origin(&self) -> Result<Url> {
        let url = Url::parse(&self.app_origin)
            .map_err(|e| KeyprintError::Config(format!("Invalid app origin: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(KeyprintError::Config(format!(
                "App origin must be http or https, got {other}"
            ))),
        }
    }

    /// Absolute proxy endpoint, if one is configured
    pub fn proxy_url(&self) -> Result<Option<Url>> {
        let Some(endpoint) = self.proxy_endpoint.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let url = self
            .origin()?
            .join(endpoint)
            .map_err(|e| KeyprintError::Config(format!("Invalid proxy endpoint: {e}")))?;
        Ok(Some(url))
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    /// QR encoder honoring the configured link size limit
    pub fn qr_encoder(&self) -> QrImageEncoder {
        QrImageEncoder {
            max_bytes: self.qr_capacity_bytes,
            ..QrImageEncoder::default()
        }
    }

    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            dpi: self.dpi,
            image_timeout: self.image_timeout(),
            draw_guides: self.draw_guides,
            nudge: self.export_nudge,
            calibration: if self.apply_print_calibration {
                self.calibration
            } else {
                PrintCalibration::IDENTITY
            },
        }
    }
}
