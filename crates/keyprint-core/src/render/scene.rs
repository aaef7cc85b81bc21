use crate::layout::{GroupGuides, PanelPlacement, Rect, SheetLayout};
use crate::panel::PanelSource;
use crate::specs::{PanelKind, PanelShape};
use crate::transform::{ImagePlacement, ImageTransform, place_image};

/// Image drawn inside a panel viewport, in sheet millimeters
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub src: String,
    pub transform: ImageTransform,
    /// Drawn rectangle after contain + transform
    pub placement: ImagePlacement,
    /// Natural size still unknown; report it back once the image loads
    pub needs_natural_size: bool,
}

/// One panel: bleed, trim and safe guides plus the clipped image
#[derive(Debug, Clone, PartialEq)]
pub struct PanelNode {
    pub key: String,
    pub kind: PanelKind,
    pub shape: PanelShape,
    pub bleed: Rect,
    pub trim: Rect,
    pub safe: Rect,
    pub viewport: Rect,
    pub hole: Option<Rect>,
    pub background_color: Option<String>,
    pub image: Option<ImageNode>,
    pub active: bool,
}

impl PanelNode {
    fn contains(&self, x_mm: f32, y_mm: f32) -> bool {
        match self.shape {
            PanelShape::Rect => self.viewport.contains(x_mm, y_mm),
            PanelShape::Circle => self.viewport.contains_inscribed(x_mm, y_mm),
        }
    }
}

/// Backend-neutral preview of an arrangement
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Cosmetic zoom for the outer container only
    pub display_scale: f32,
    pub panels: Vec<PanelNode>,
    pub fold_lines_x_mm: Vec<f32>,
    pub group_guides: Option<GroupGuides>,
}

impl Scene {
    /// Panel whose viewport contains the point (sheet mm)
    pub fn hit_test(&self, x_mm: f32, y_mm: f32) -> Option<&str> {
        self.panels
            .iter()
            .rev()
            .find(|p| p.contains(x_mm, y_mm))
            .map(|p| p.key.as_str())
    }

    /// Convert a point inside the displayed scene (screen px, relative to
    /// its top-left) to sheet millimeters
    pub fn screen_to_mm(&self, x_px: f32, y_px: f32, px_per_mm: f32) -> (f32, f32) {
        let k = px_per_mm * self.display_scale;
        (x_px / k, y_px / k)
    }

    pub fn panel(&self, key: &str) -> Option<&PanelNode> {
        self.panels.iter().find(|p| p.key == key)
    }
}

/// Largest display scale at which the scene fits the available space,
/// never enlarging past 1:1 physical size
pub fn fit_display_scale(
    available_w_px: f32,
    available_h_px: f32,
    content_w_mm: f32,
    content_h_mm: f32,
    px_per_mm: f32,
) -> f32 {
    if content_w_mm <= 0.0 || content_h_mm <= 0.0 || px_per_mm <= 0.0 {
        return 1.0;
    }
    let sx = available_w_px / (content_w_mm * px_per_mm);
    let sy = available_h_px / (content_h_mm * px_per_mm);
    sx.min(sy).clamp(0.05, 1.0)
}

/// Build the preview scene for a computed layout
pub fn build_scene(
    sheet: &SheetLayout,
    panels: &impl PanelSource,
    active: Option<&str>,
    display_scale: f32,
) -> Scene {
    Scene {
        width_mm: sheet.width_mm,
        height_mm: sheet.height_mm,
        display_scale,
        panels: sheet
            .placements
            .iter()
            .map(|placement| panel_node(placement, panels, active))
            .collect(),
        fold_lines_x_mm: sheet.fold_lines_x_mm.clone(),
        group_guides: sheet.group_guides,
    }
}

fn panel_node(
    placement: &PanelPlacement,
    panels: &impl PanelSource,
    active: Option<&str>,
) -> PanelNode {
    let record = panels.panel(&placement.key);
    let image = record.and_then(|r| {
        let src = r.image_ref.clone().filter(|s| !s.is_empty())?;
        let natural = r.natural_size();
        let t = r.transform;
        Some(ImageNode {
            src,
            transform: t,
            placement: place_image(
                &placement.viewport,
                natural,
                &t,
                (t.translate_x_mm, t.translate_y_mm),
            ),
            needs_natural_size: natural.is_none(),
        })
    });

    PanelNode {
        key: placement.key.clone(),
        kind: placement.kind,
        shape: placement.shape,
        bleed: placement.bleed,
        trim: placement.trim,
        safe: placement.safe,
        viewport: placement.viewport,
        hole: placement.hole,
        background_color: record.and_then(|r| r.background_color.clone()),
        image,
        active: active == Some(placement.key.as_str()),
    }
}
