use crate::types::{Result, SheetPdfError};
use keyprint_core::SizeMm;
use keyprint_core::specs::SHEET;
use keyprint_core::units::DEFAULT_DPI;

/// Page setup for a single-sheet print PDF
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPdfOptions {
    pub title: String,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Resolution the raster was rendered at
    pub dpi: u32,
}

impl Default for SheetPdfOptions {
    fn default() -> Self {
        Self::for_sheet("Print sheet", SHEET, DEFAULT_DPI)
    }
}

impl SheetPdfOptions {
    pub fn for_sheet(title: impl Into<String>, size: SizeMm, dpi: u32) -> Self {
        Self {
            title: title.into(),
            page_width_mm: size.width_mm,
            page_height_mm: size.height_mm,
            dpi,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_width_mm <= 0.0 || self.page_height_mm <= 0.0 {
            return Err(SheetPdfError::Config(format!(
                "Page size must be positive, got {}x{} mm",
                self.page_width_mm, self.page_height_mm
            )));
        }
        if self.dpi == 0 {
            return Err(SheetPdfError::Config("DPI must be positive".to_string()));
        }
        Ok(())
    }
}
