//! Per-panel image transform and the placement math shared by both renderers

use crate::layout::Rect;
use crate::specs::SizeMm;
use serde::{Deserialize, Serialize};

// =============================================================================
// Bounds
// =============================================================================

/// Below 1.0 the image would no longer cover its contain box
pub const MIN_SCALE: f32 = 1.0;

pub const MAX_SCALE: f32 = 5.0;

/// Scale multiplier per zoom-in step
pub const ZOOM_IN_FACTOR: f32 = 1.05;

/// Scale multiplier per zoom-out step
pub const ZOOM_OUT_FACTOR: f32 = 0.95;

/// Translation per keyboard nudge
pub const NUDGE_STEP_MM: f32 = 1.0;

/// Clamp a scale into `[MIN_SCALE, MAX_SCALE]`; non-finite values fall back to the minimum
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        MIN_SCALE
    }
}

// =============================================================================
// Transform
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    pub fn factor(self) -> f32 {
        match self {
            ZoomDirection::In => ZOOM_IN_FACTOR,
            ZoomDirection::Out => ZOOM_OUT_FACTOR,
        }
    }
}

/// Affine state of a panel image, in millimeters around the viewport center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    pub translate_x_mm: f32,
    pub translate_y_mm: f32,
    pub scale: f32,
    pub rotation_deg: f32,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ImageTransform {
    pub const IDENTITY: ImageTransform = ImageTransform {
        translate_x_mm: 0.0,
        translate_y_mm: 0.0,
        scale: 1.0,
        rotation_deg: 0.0,
    };

    pub fn with_scale(self, scale: f32) -> Self {
        Self {
            scale: clamp_scale(scale),
            ..self
        }
    }

    pub fn zoomed(self, direction: ZoomDirection) -> Self {
        self.with_scale(self.scale * direction.factor())
    }

    pub fn translated(self, dx_mm: f32, dy_mm: f32) -> Self {
        Self {
            translate_x_mm: self.translate_x_mm + dx_mm,
            translate_y_mm: self.translate_y_mm + dy_mm,
            ..self
        }
    }

    /// Same transform with the scale pulled back into bounds
    pub fn clamped(self) -> Self {
        self.with_scale(self.scale)
    }

    /// CSS transform list, applied with `transform-origin: center`
    pub fn css(&self) -> String {
        format!(
            "translate({}mm, {}mm) scale({}) rotate({}deg)",
            self.translate_x_mm, self.translate_y_mm, self.scale, self.rotation_deg
        )
    }
}

/// Factor that makes an image of the given pixel size fill the viewport
///
/// Returns `None` while the natural size is unknown or degenerate.
pub fn cover_factor(viewport: SizeMm, natural: Option<(u32, u32)>) -> Option<f32> {
    let (w, h) = natural?;
    if w == 0 || h == 0 || viewport.width_mm <= 0.0 || viewport.height_mm <= 0.0 {
        return None;
    }
    let viewport_aspect = viewport.aspect();
    let image_aspect = w as f32 / h as f32;
    Some((viewport_aspect / image_aspect).max(image_aspect / viewport_aspect))
}

// =============================================================================
// Placement
// =============================================================================

/// Where an image lands relative to its viewport, in the viewport's units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation_deg: f32,
    /// Source pixels to destination units, including the stored scale
    pub pixel_scale: f32,
}

impl ImagePlacement {
    pub fn left(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.height / 2.0
    }
}

/// Place an image inside `viewport` the way `object-fit: contain` followed
/// by the CSS transform would.
///
/// `viewport` and `translation` share units (mm for the preview, px for
/// export). Without a natural size the image is assumed to match the
/// viewport aspect.
pub fn place_image(
    viewport: &Rect,
    natural: Option<(u32, u32)>,
    transform: &ImageTransform,
    translation: (f32, f32),
) -> ImagePlacement {
    let (base_w, base_h, contain) = match natural {
        Some((w, h)) if w > 0 && h > 0 => {
            let contain = (viewport.width / w as f32).min(viewport.height / h as f32);
            (w as f32 * contain, h as f32 * contain, contain)
        }
        _ => (viewport.width, viewport.height, 1.0),
    };
    let scale = transform.scale;
    ImagePlacement {
        center_x: viewport.center_x() + translation.0,
        center_y: viewport.center_y() + translation.1,
        width: base_w * scale,
        height: base_h * scale,
        rotation_deg: transform.rotation_deg,
        pixel_scale: contain * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_stays_in_bounds() {
        let mut t = ImageTransform::IDENTITY;
        for _ in 0..100 {
            t = t.zoomed(ZoomDirection::In);
        }
        assert_eq!(t.scale, MAX_SCALE);
        for _ in 0..100 {
            t = t.zoomed(ZoomDirection::Out);
        }
        assert_eq!(t.scale, MIN_SCALE);
    }

    #[test]
    fn non_finite_scale_is_reset() {
        assert_eq!(clamp_scale(f32::NAN), MIN_SCALE);
        assert_eq!(clamp_scale(f32::INFINITY), MIN_SCALE);
    }

    #[test]
    fn cover_factor_for_wide_image_in_tall_viewport() {
        let f = cover_factor(SizeMm::new(35.0, 45.0), Some((200, 100))).unwrap();
        let expected = 2.0 / (35.0 / 45.0);
        assert!((f - expected).abs() < 1e-5);
        assert!(cover_factor(SizeMm::new(35.0, 45.0), None).is_none());
    }

    #[test]
    fn contain_placement_is_centered() {
        let vp = Rect::new(0.0, 0.0, 40.0, 40.0);
        let p = place_image(&vp, Some((200, 100)), &ImageTransform::IDENTITY, (0.0, 0.0));
        assert_eq!((p.width, p.height), (40.0, 20.0));
        assert_eq!((p.left(), p.top()), (0.0, 10.0));
        assert_eq!(p.pixel_scale, 0.2);
    }
}
