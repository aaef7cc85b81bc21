//! Sheet export shared by the command line and the kiosk worker

use crate::types::Result;
use keyprint_core::{
    ImageLoader, KioskOptions, RasterFormat, RasterOptions, RasterOutcome, SheetPlan,
    failed_panels_warning, rasterize, save_raster,
};
use keyprint_pdf::{SheetPdfOptions, generate_sheet_pdf};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File format of an exported sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Guess from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }
}

impl From<RasterFormat> for ExportFormat {
    fn from(format: RasterFormat) -> Self {
        match format {
            RasterFormat::Png => ExportFormat::Png,
            RasterFormat::Jpeg => ExportFormat::Jpeg,
        }
    }
}

/// What an export produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub width_px: u32,
    pub height_px: u32,
    /// Labels of panels left blank because their image failed
    pub failed_panels: Vec<String>,
}

impl ExportReport {
    pub fn warning(&self) -> Option<String> {
        failed_panels_warning(&self.failed_panels)
    }
}

/// Rasterize `plan` at the configured resolution and write it to `output_path`.
///
/// Panels whose image fails are left blank and listed in the report; the
/// file is still written.
pub async fn export_sheet(
    plan: &SheetPlan,
    loader: Arc<dyn ImageLoader>,
    options: &KioskOptions,
    format: ExportFormat,
    output_path: impl AsRef<Path>,
) -> Result<ExportReport> {
    let output_path = output_path.as_ref().to_owned();
    let raster_options = options.raster_options();
    let outcome = rasterize(plan, loader, &raster_options).await?;
    let (width_px, height_px) = outcome.image.dimensions();

    match format {
        ExportFormat::Png => {
            save_raster(outcome.image, RasterFormat::Png, options.jpeg_quality, &output_path)
                .await?
        }
        ExportFormat::Jpeg => {
            save_raster(outcome.image, RasterFormat::Jpeg, options.jpeg_quality, &output_path)
                .await?
        }
        ExportFormat::Pdf => {
            let pdf_options = SheetPdfOptions::for_sheet(
                "Keyprint sheet",
                plan.sheet_layout().size(),
                raster_options.dpi,
            );
            generate_sheet_pdf(&outcome.image, &pdf_options, &output_path).await?;
        }
    }

    let report = ExportReport {
        path: output_path,
        format,
        width_px,
        height_px,
        failed_panels: outcome.failed_panels,
    };
    if let Some(warning) = report.warning() {
        log::warn!("{warning}");
    }
    log::info!("Exported {} ({}x{} px)", report.path.display(), width_px, height_px);
    Ok(report)
}

/// Quick raster of `plan` for on-screen preview; guides on, no calibration
pub async fn render_preview(
    plan: &SheetPlan,
    loader: Arc<dyn ImageLoader>,
    options: &KioskOptions,
    dpi: u32,
) -> Result<RasterOutcome> {
    let raster_options = RasterOptions {
        dpi,
        image_timeout: options.image_timeout(),
        draw_guides: true,
        ..Default::default()
    };
    Ok(rasterize(plan, loader, &raster_options).await?)
}
