//! Vector compositing of a sheet
//!
//! Everything is described in sheet millimeters and drawn through one
//! sheet transform (calibration about the sheet center, then mm to pixels).
//! Panel images are clipped by a mask built from the viewport shape, with the
//! disc hole cut out by the even-odd rule.

use super::RasterOptions;
use crate::layout::{PanelPlacement, Rect, SheetLayout};
use crate::panel::PanelRecord;
use crate::specs::PanelShape;
use crate::transform::place_image;
use crate::types::{KeyprintError, Result};
use crate::units::{mm_to_px, mm_to_px_extent};
use image::{Rgba, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, IntSize, Mask, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, StrokeDash, Transform,
};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TRIM_COLOR: Rgba<u8> = Rgba([229, 57, 53, 255]);
const SAFE_COLOR: Rgba<u8> = Rgba([30, 136, 229, 255]);
const FOLD_COLOR: Rgba<u8> = Rgba([158, 158, 158, 255]);

const GUIDE_WIDTH_MM: f32 = 0.2;
const DASH_MM: f32 = 1.0;

/// One panel ready to draw
#[derive(Debug, Clone)]
pub(crate) struct LoadedPanel {
    pub placement: PanelPlacement,
    pub record: PanelRecord,
    pub image: Option<RgbaImage>,
}

/// Sheet millimeters to canvas pixels, including calibration
fn sheet_transform(sheet: &SheetLayout, options: &RasterOptions) -> Transform {
    let px_per_mm = mm_to_px(1.0, options.dpi);
    let (cx, cy) = (sheet.width_mm / 2.0, sheet.height_mm / 2.0);
    Transform::from_scale(px_per_mm, px_per_mm)
        .pre_translate(cx, cy)
        .pre_scale(options.calibration.scale_x, options.calibration.scale_y)
        .pre_translate(-cx, -cy)
}

/// Compose the sheet onto a white canvas at the configured resolution
pub(crate) fn compose(
    sheet: &SheetLayout,
    panels: &[LoadedPanel],
    options: &RasterOptions,
) -> Result<RgbaImage> {
    let width = mm_to_px_extent(sheet.width_mm, options.dpi);
    let height = mm_to_px_extent(sheet.height_mm, options.dpi);
    let mut canvas = Pixmap::new(width, height).ok_or_else(|| {
        KeyprintError::Layout(format!("Cannot allocate a {width}x{height} sheet"))
    })?;
    canvas.fill(Color::WHITE);
    let transform = sheet_transform(sheet, options);

    for panel in panels {
        draw_panel(&mut canvas, transform, panel, options)?;
    }

    if options.draw_guides {
        for panel in panels {
            draw_panel_guides(&mut canvas, transform, &panel.placement);
        }
        for &x in &sheet.fold_lines_x_mm {
            let mut pb = PathBuilder::new();
            pb.move_to(x, 0.0);
            pb.line_to(x, sheet.height_mm);
            if let Some(path) = pb.finish() {
                stroke(&mut canvas, transform, &path, FOLD_COLOR, true);
            }
        }
        if let Some(guides) = &sheet.group_guides {
            if let Some(path) = rect_path(&guides.trim) {
                stroke(&mut canvas, transform, &path, TRIM_COLOR, false);
            }
            if let Some(path) = rect_path(&guides.safe) {
                stroke(&mut canvas, transform, &path, SAFE_COLOR, true);
            }
        }
    }

    Ok(to_rgba_image(&canvas))
}

fn draw_panel(
    canvas: &mut Pixmap,
    transform: Transform,
    panel: &LoadedPanel,
    options: &RasterOptions,
) -> Result<()> {
    let placement = &panel.placement;
    let Some(clip) = clip_path(placement) else {
        log::debug!("Panel '{}' has an empty viewport", placement.key);
        return Ok(());
    };

    if let Some(color) = panel
        .record
        .background_color
        .as_deref()
        .and_then(parse_color)
    {
        canvas.fill_path(&clip, &paint(color), FillRule::EvenOdd, transform, None);
    }

    let Some(image) = &panel.image else {
        return Ok(());
    };
    let source = to_pixmap(image)?;

    let mut mask = Mask::new(canvas.width(), canvas.height())
        .ok_or_else(|| KeyprintError::Layout("Cannot allocate clip mask".to_string()))?;
    mask.fill_path(&clip, FillRule::EvenOdd, true, transform);

    let t = panel.record.transform.clamped();
    let placed = place_image(
        &placement.viewport,
        Some(image.dimensions()),
        &t,
        (
            t.translate_x_mm + options.nudge.x_mm,
            t.translate_y_mm + options.nudge.y_mm,
        ),
    );
    // Image pixels centered on the placement, then rotated and scaled into mm
    let image_transform = transform
        .pre_translate(placed.center_x, placed.center_y)
        .pre_rotate(placed.rotation_deg)
        .pre_scale(placed.pixel_scale, placed.pixel_scale)
        .pre_translate(-(image.width() as f32) / 2.0, -(image.height() as f32) / 2.0);

    let image_paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(0, 0, source.as_ref(), &image_paint, image_transform, Some(&mask));
    Ok(())
}

/// Viewport outline, with the disc hole as a second subpath
fn clip_path(placement: &PanelPlacement) -> Option<Path> {
    let mut pb = PathBuilder::new();
    push_shape(&mut pb, &placement.viewport, placement.shape)?;
    if let Some(hole) = &placement.hole {
        push_shape(&mut pb, hole, PanelShape::Circle)?;
    }
    pb.finish()
}

fn push_shape(pb: &mut PathBuilder, rect: &Rect, shape: PanelShape) -> Option<()> {
    let rect = skia_rect(rect)?;
    match shape {
        PanelShape::Rect => pb.push_rect(rect),
        PanelShape::Circle => pb.push_oval(rect),
    }
    Some(())
}

fn skia_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn rect_path(rect: &Rect) -> Option<Path> {
    skia_rect(rect).map(PathBuilder::from_rect)
}

fn oval_path(rect: &Rect) -> Option<Path> {
    skia_rect(rect).and_then(PathBuilder::from_oval)
}

fn paint(color: Rgba<u8>) -> Paint<'static> {
    let [r, g, b, a] = color.0;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| KeyprintError::Layout("Panel image is empty".to_string()))?;
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| KeyprintError::Layout("Cannot allocate panel image".to_string()))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

/// `#rgb`, `#rrggbb` or a handful of named colors
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    rgb[i] = v * 17;
                }
                Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
            }
            6 => Some(Rgba([
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
                255,
            ])),
            _ => None,
        };
    }
    match value.to_ascii_lowercase().as_str() {
        "white" => Some(WHITE),
        "black" => Some(Rgba([0, 0, 0, 255])),
        "red" => Some(Rgba([255, 0, 0, 255])),
        "green" => Some(Rgba([0, 128, 0, 255])),
        "blue" => Some(Rgba([0, 0, 255, 255])),
        "gray" | "grey" => Some(Rgba([128, 128, 128, 255])),
        _ => None,
    }
}

// =============================================================================
// Guides
// =============================================================================

fn draw_panel_guides(canvas: &mut Pixmap, transform: Transform, placement: &PanelPlacement) {
    let outline = match placement.shape {
        PanelShape::Rect => rect_path,
        PanelShape::Circle => oval_path,
    };
    if let Some(path) = outline(&placement.trim) {
        stroke(canvas, transform, &path, TRIM_COLOR, false);
    }
    if let Some(path) = outline(&placement.safe) {
        stroke(canvas, transform, &path, SAFE_COLOR, true);
    }
    if let Some(path) = placement.hole.as_ref().and_then(oval_path) {
        stroke(canvas, transform, &path, TRIM_COLOR, false);
    }
}

fn stroke(canvas: &mut Pixmap, transform: Transform, path: &Path, color: Rgba<u8>, dashed: bool) {
    let stroke = Stroke {
        width: GUIDE_WIDTH_MM,
        dash: if dashed {
            StrokeDash::new(vec![DASH_MM, DASH_MM], 0.0)
        } else {
            None
        },
        ..Stroke::default()
    };
    canvas.stroke_path(path, &paint(color), &stroke, transform, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Arrangement, arrange};
    use crate::types::PrintCalibration;

    fn sheet() -> SheetLayout {
        SheetLayout {
            width_mm: 100.0,
            height_mm: 148.0,
            placements: Vec::new(),
            fold_lines_x_mm: Vec::new(),
            group_guides: None,
        }
    }

    #[test]
    fn parses_hex_and_named_colors() {
        assert_eq!(parse_color("#fff"), Some(WHITE));
        assert_eq!(parse_color("#1e88e5"), Some(SAFE_COLOR));
        assert_eq!(parse_color("Black"), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("tomato"), None);
    }

    #[test]
    fn calibration_scales_about_the_sheet_center() {
        let options = RasterOptions {
            dpi: 254,
            calibration: PrintCalibration {
                scale_x: 0.95,
                scale_y: 0.95,
            },
            ..RasterOptions::default()
        };
        let t = sheet_transform(&sheet(), &options);
        let px_per_mm = mm_to_px(1.0, 254);

        let mut center = [tiny_skia::Point::from_xy(50.0, 74.0)];
        t.map_points(&mut center);
        assert!((center[0].x - 50.0 * px_per_mm).abs() < 1e-2);
        assert!((center[0].y - 74.0 * px_per_mm).abs() < 1e-2);

        let mut corner = [tiny_skia::Point::from_xy(0.0, 0.0)];
        t.map_points(&mut corner);
        assert!((corner[0].x - 2.5 * px_per_mm).abs() < 1e-2);
        assert!((corner[0].y - 3.7 * px_per_mm).abs() < 1e-2);
    }

    #[test]
    fn disc_clip_excludes_hole_and_corners() {
        let layout = arrange(Arrangement::Disc, |_| true);
        let disc = &layout.placements[0];
        let red = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let panel = LoadedPanel {
            placement: disc.clone(),
            record: PanelRecord::new(disc.kind),
            image: Some(red),
        };
        let options = RasterOptions {
            dpi: 100,
            draw_guides: false,
            ..RasterOptions::default()
        };
        let image = compose(&layout, &[panel], &options).unwrap();

        let at = |x_mm: f32, y_mm: f32| {
            *image.get_pixel(mm_to_px(x_mm, 100) as u32, mm_to_px(y_mm, 100) as u32)
        };
        let v = &disc.viewport;
        assert_eq!(at(v.center_x(), v.center_y()), WHITE);
        assert_eq!(at(v.center_x() + 10.0, v.center_y()), Rgba([255, 0, 0, 255]));
        assert_eq!(at(v.x + 1.0, v.y + 1.0), WHITE);
    }
}
