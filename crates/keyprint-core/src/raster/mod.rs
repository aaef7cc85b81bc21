//! Print-resolution export
//!
//! Images are loaded one panel at a time, each bounded by a timeout. A panel
//! whose image fails keeps its background and guides; the failures are
//! reported together once the sheet is done.

mod compose;
mod loader;

pub use compose::parse_color;
pub use loader::{HttpImageLoader, ImageLoader};

use crate::panel::PanelSource;
use crate::sheet::SheetPlan;
use crate::specs::EXPORT_NUDGE;
use crate::types::*;
use crate::units::DEFAULT_DPI;
use compose::{LoadedPanel, compose};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Encoded output format of an exported sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub dpi: u32,
    pub image_timeout: Duration,
    pub draw_guides: bool,
    /// Added to every panel translation
    pub nudge: OffsetMm,
    pub calibration: PrintCalibration,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            image_timeout: Duration::from_secs(15),
            draw_guides: true,
            nudge: EXPORT_NUDGE,
            calibration: PrintCalibration::IDENTITY,
        }
    }
}

/// A rendered sheet plus the panels whose image could not be loaded
#[derive(Debug, Clone)]
pub struct RasterOutcome {
    pub image: RgbaImage,
    /// Display labels, in sheet order
    pub failed_panels: Vec<String>,
}

impl RasterOutcome {
    /// One consolidated message for all failed panels
    pub fn warning(&self) -> Option<String> {
        failed_panels_warning(&self.failed_panels)
    }
}

/// Consolidated message naming every panel left blank
pub fn failed_panels_warning(failed_panels: &[String]) -> Option<String> {
    if failed_panels.is_empty() {
        None
    } else {
        Some(format!(
            "Some images could not be loaded and were left blank: {}",
            failed_panels.join(", ")
        ))
    }
}

/// Render a sheet at print resolution
pub async fn rasterize(
    plan: &SheetPlan,
    loader: Arc<dyn ImageLoader>,
    options: &RasterOptions,
) -> Result<RasterOutcome> {
    let sheet = plan.sheet_layout();
    let mut panels = Vec::with_capacity(sheet.placements.len());
    let mut failed_panels = Vec::new();

    for placement in &sheet.placements {
        let Some(record) = plan.panel(&placement.key) else {
            continue;
        };
        let image = match record.image_ref.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(reference) => {
                match load_with_timeout(loader.clone(), reference, options.image_timeout).await {
                    Ok(image) => Some(image.to_rgba8()),
                    Err(e) => {
                        log::warn!("Panel '{}': {}", placement.key, e);
                        failed_panels.push(plan.label(&placement.key));
                        None
                    }
                }
            }
        };
        panels.push(LoadedPanel {
            placement: placement.clone(),
            record: record.clone(),
            image,
        });
    }

    let options = options.clone();
    let image = tokio::task::spawn_blocking(move || compose(&sheet, &panels, &options)).await??;

    log::info!(
        "Rendered {}x{} sheet, {} image(s) failed",
        image.width(),
        image.height(),
        failed_panels.len()
    );
    Ok(RasterOutcome {
        image,
        failed_panels,
    })
}

/// Load one image on a blocking thread, giving up after `timeout`
pub async fn load_with_timeout(
    loader: Arc<dyn ImageLoader>,
    reference: &str,
    timeout: Duration,
) -> Result<DynamicImage> {
    let reference = reference.to_string();
    let task = tokio::task::spawn_blocking(move || loader.load(&reference));
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => Err(KeyprintError::Timeout(timeout)),
    }
}

/// Encode a rendered sheet
pub fn encode_raster(image: &RgbaImage, format: RasterFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    match format {
        RasterFormat::Png => {
            let mut out = Cursor::new(Vec::new());
            image.write_to(&mut out, ImageFormat::Png)?;
            Ok(out.into_inner())
        }
        RasterFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, jpeg_quality.clamp(1, 100)).encode_image(&rgb)?;
            Ok(out)
        }
    }
}

/// Encode and write a rendered sheet
pub async fn save_raster(
    image: RgbaImage,
    format: RasterFormat,
    jpeg_quality: u8,
    path: impl AsRef<Path>,
) -> Result<()> {
    let bytes =
        tokio::task::spawn_blocking(move || encode_raster(&image, format, jpeg_quality)).await??;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
