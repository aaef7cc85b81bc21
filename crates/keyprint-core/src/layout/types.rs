//! Layout data types
//!
//! These types are the output of the layout engine and the shared input of
//! the preview scene and the export rasterizer.

use crate::specs::{PanelKind, PanelShape, SizeMm};

/// A rectangle in millimeters, origin at the top-left of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` sharing its center with `self`
    pub fn centered(&self, size: SizeMm) -> Self {
        Self::new(
            self.center_x() - size.width_mm / 2.0,
            self.center_y() - size.height_mm / 2.0,
            size.width_mm,
            size.height_mm,
        )
    }

    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Containment test against the ellipse inscribed in the rectangle
    pub fn contains_inscribed(&self, x: f32, y: f32) -> bool {
        let rx = self.width / 2.0;
        let ry = self.height / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let dx = (x - self.center_x()) / rx;
        let dy = (y - self.center_y()) / ry;
        dx * dx + dy * dy <= 1.0
    }
}

/// Final position of one panel on a sheet or preview
///
/// All boxes are concentric; trim, safe and viewport are centered in the
/// bleed box.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelPlacement {
    /// Slot key within the arrangement
    pub key: String,
    pub kind: PanelKind,
    pub shape: PanelShape,
    pub bleed: Rect,
    pub trim: Rect,
    pub safe: Rect,
    pub viewport: Rect,
    /// Center hole for discs
    pub hole: Option<Rect>,
}

impl PanelPlacement {
    pub(crate) fn at(key: impl Into<String>, kind: PanelKind, x: f32, y: f32) -> Self {
        let geometry = kind.geometry();
        let bleed = Rect::new(x, y, geometry.bleed.width_mm, geometry.bleed.height_mm);
        let trim = bleed.centered(geometry.trim);
        Self {
            key: key.into(),
            kind,
            shape: geometry.shape,
            bleed,
            trim,
            safe: trim.centered(geometry.safe),
            viewport: trim.centered(geometry.viewport),
            hole: geometry
                .hole_diameter_mm
                .map(|d| trim.centered(SizeMm::square(d))),
        }
    }
}

/// Guide boxes drawn around a whole group of panels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupGuides {
    pub trim: Rect,
    pub safe: Rect,
}

/// A computed arrangement: overall size plus one placement per present panel
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub placements: Vec<PanelPlacement>,
    /// X positions of vertical fold lines
    pub fold_lines_x_mm: Vec<f32>,
    pub group_guides: Option<GroupGuides>,
}

impl SheetLayout {
    pub fn placement(&self, key: &str) -> Option<&PanelPlacement> {
        self.placements.iter().find(|p| p.key == key)
    }

    pub fn size(&self) -> SizeMm {
        SizeMm::new(self.width_mm, self.height_mm)
    }
}
