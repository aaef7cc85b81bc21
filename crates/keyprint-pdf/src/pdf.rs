use crate::options::SheetPdfOptions;
use crate::types::{Result, SheetPdfError};
use ::image::{DynamicImage, RgbaImage};
use keyprint_core::units::px_to_mm;
use printpdf::*;
use std::path::Path;

pub async fn generate_sheet_pdf(
    sheet: &RgbaImage,
    options: &SheetPdfOptions,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let sheet = sheet.clone();
    let options = options.clone();
    let output_path = output_path.as_ref().to_owned();

    let bytes = tokio::task::spawn_blocking(move || sheet_pdf_bytes(&sheet, &options)).await??;

    tokio::fs::write(&output_path, bytes).await?;
    log::info!("Wrote {}", output_path.display());

    Ok(())
}

/// One page at the sheet's physical size with the raster stretched to fill it
pub fn sheet_pdf_bytes(sheet: &RgbaImage, options: &SheetPdfOptions) -> Result<Vec<u8>> {
    options.validate()?;
    let (width_px, height_px) = sheet.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(SheetPdfError::Pdf("Sheet image is empty".to_string()));
    }

    let mut doc = PdfDocument::new(&options.title);

    // PDF has no alpha here; the sheet is already composed on white
    let rgb = DynamicImage::ImageRgba8(sheet.clone()).to_rgb8();
    let raw = RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: width_px as usize,
        height: height_px as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let image_id = doc.add_image(&raw);

    let (scale_x, scale_y) = fill_scale(width_px, height_px, options);
    let ops = vec![Op::UseXobject {
        id: image_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(0.0)),
            rotate: None,
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(options.dpi as f32),
        },
    }];

    doc.pages.push(PdfPage::new(
        Mm(options.page_width_mm),
        Mm(options.page_height_mm),
        ops,
    ));

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("PDF writer reported {} warning(s)", warnings.len());
    }

    Ok(bytes)
}

/// Stretch from the raster's natural size at `dpi` to the full page; absorbs
/// pixel rounding
fn fill_scale(width_px: u32, height_px: u32, options: &SheetPdfOptions) -> (f32, f32) {
    let natural_width_mm = px_to_mm(width_px as f32, options.dpi);
    let natural_height_mm = px_to_mm(height_px as f32, options.dpi);
    (
        options.page_width_mm / natural_width_mm,
        options.page_height_mm / natural_height_mm,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyprint_core::specs::SHEET;
    use keyprint_core::units::mm_to_px_extent;

    #[test]
    fn raster_at_export_dpi_fills_page_unscaled() {
        let options = SheetPdfOptions::for_sheet("Sheet", SHEET, 254);
        let w = mm_to_px_extent(SHEET.width_mm, 254);
        let h = mm_to_px_extent(SHEET.height_mm, 254);
        let (sx, sy) = fill_scale(w, h, &options);
        assert!((sx - 1.0).abs() < 1e-3, "{sx}");
        assert!((sy - 1.0).abs() < 1e-3, "{sy}");
    }

    #[test]
    fn short_raster_is_stretched() {
        let options = SheetPdfOptions::for_sheet("Sheet", SHEET, 254);
        let w = mm_to_px_extent(SHEET.width_mm, 254);
        let h = mm_to_px_extent(SHEET.height_mm, 254);
        let (sx, sy) = fill_scale(w / 2, h, &options);
        assert!((sx - 2.0).abs() < 1e-2, "{sx}");
        assert!((sy - 1.0).abs() < 1e-3, "{sy}");
    }
}
