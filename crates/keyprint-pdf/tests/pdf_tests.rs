use image::{Rgba, RgbaImage};
use keyprint_core::specs::SHEET;
use keyprint_core::units::mm_to_px_extent;
use keyprint_pdf::*;

fn blank_sheet(dpi: u32) -> RgbaImage {
    RgbaImage::from_pixel(
        mm_to_px_extent(SHEET.width_mm, dpi),
        mm_to_px_extent(SHEET.height_mm, dpi),
        Rgba([255, 255, 255, 255]),
    )
}

#[test]
fn test_pdf_bytes_have_header() {
    let options = SheetPdfOptions::for_sheet("Four-up", SHEET, 72);
    let bytes = sheet_pdf_bytes(&blank_sheet(72), &options).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_invalid_options_are_rejected() {
    let options = SheetPdfOptions {
        dpi: 0,
        ..Default::default()
    };
    assert!(matches!(
        sheet_pdf_bytes(&blank_sheet(72), &options),
        Err(SheetPdfError::Config(_))
    ));

    let empty = RgbaImage::new(0, 0);
    assert!(sheet_pdf_bytes(&empty, &SheetPdfOptions::default()).is_err());
}

#[tokio::test]
async fn test_generate_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.pdf");
    let options = SheetPdfOptions::for_sheet("CD sheet", SHEET, 72);
    generate_sheet_pdf(&blank_sheet(72), &options, &path)
        .await
        .unwrap();
    let written = tokio::fs::read(&path).await.unwrap();
    assert!(written.starts_with(b"%PDF"));
}
