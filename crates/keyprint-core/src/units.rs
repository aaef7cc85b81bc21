//! Physical unit conversion
//!
//! Every millimeter to pixel conversion in the crate goes through this
//! module: the preview uses the float forms, the rasterizer the rounded ones.

// =============================================================================
// Constants
// =============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Print resolution used for export
pub const DEFAULT_DPI: u32 = 300;

/// On-screen pixels per millimeter at 96 dpi, as used for drag deltas
pub const SCREEN_PX_PER_MM: f32 = 3.78;

// =============================================================================
// Conversion
// =============================================================================

/// Convert millimeters to (fractional) pixels at the given DPI
#[inline]
pub fn mm_to_px(mm: f32, dpi: u32) -> f32 {
    mm / MM_PER_INCH * dpi as f32
}

/// Convert millimeters to whole pixels at the given DPI
#[inline]
pub fn mm_to_px_rounded(mm: f32, dpi: u32) -> i32 {
    mm_to_px(mm, dpi).round() as i32
}

/// Convert a non-negative extent in millimeters to a pixel dimension
#[inline]
pub fn mm_to_px_extent(mm: f32, dpi: u32) -> u32 {
    mm_to_px_rounded(mm, dpi).max(0) as u32
}

/// Convert pixels back to millimeters at the given DPI
#[inline]
pub fn px_to_mm(px: f32, dpi: u32) -> f32 {
    px * MM_PER_INCH / dpi as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_inch_is_dpi_pixels() {
        assert_eq!(mm_to_px(25.4, 300), 300.0);
        assert_eq!(mm_to_px_rounded(25.4, 96), 96);
    }

    #[test]
    fn sheet_extent_at_print_dpi() {
        assert_eq!(mm_to_px_extent(100.0, DEFAULT_DPI), 1181);
        assert_eq!(mm_to_px_extent(148.0, DEFAULT_DPI), 1748);
        assert_eq!(mm_to_px_extent(-3.0, DEFAULT_DPI), 0);
    }
}
