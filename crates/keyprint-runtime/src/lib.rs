use std::path::PathBuf;

mod export;
mod types;

pub use export::{ExportFormat, ExportReport, export_sheet, render_preview};
pub use types::*;

// Re-export types from library crates
pub use keyprint_core::{KioskOptions, Layout, SheetKind, SheetPlan};

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum KioskCommand {
    /// Fetch an image for display and natural-size measurement
    LoadImage {
        key: String,
        reference: String,
    },
    GenerateShareCode {
        layout: Layout,
    },
    /// Low-resolution raster of a sheet for on-screen preview
    RenderSheetPreview {
        plan: SheetPlan,
        dpi: u32,
    },
    ExportSheet {
        plan: SheetPlan,
        format: ExportFormat,
        output_path: PathBuf,
    },
    LoadConfig {
        path: PathBuf,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum KioskUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    /// Texture pixels may be downscaled; `natural_*` is the source size
    ImageLoaded {
        key: String,
        reference: String,
        natural_width: u32,
        natural_height: u32,
        width: usize,
        height: usize,
        rgba_data: Vec<u8>,
    },
    /// Image could not be fetched; the panel stays empty
    ImageFailed {
        key: String,
        reference: String,
        message: String,
    },
    /// `qr_pixels` is the rendered symbol, one gray byte per pixel
    ShareCodeReady {
        url: String,
        layout: Layout,
        attempts: usize,
        qr_width: usize,
        qr_height: usize,
        qr_pixels: Vec<u8>,
    },
    SheetPreviewRendered {
        width: usize,
        height: usize,
        rgba_data: Vec<u8>,
        failed_panels: Vec<String>,
    },
    ExportComplete {
        report: ExportReport,
    },
    ConfigLoaded {
        options: KioskOptions,
    },
    Error {
        message: String,
    },
}
