//! Physical product dimensions
//!
//! Fixed millimeter constants taken from the printed products. The panel
//! table is the single source of truth for panel geometry: every
//! `PanelKind` indexes exactly one row.

use crate::types::{OffsetMm, PrintCalibration};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Sizes
// =============================================================================

/// A width/height pair in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeMm {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl SizeMm {
    pub const fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    pub const fn square(side_mm: f32) -> Self {
        Self::new(side_mm, side_mm)
    }

    pub fn aspect(&self) -> f32 {
        self.width_mm / self.height_mm
    }
}

// =============================================================================
// Sheet
// =============================================================================

/// Photo print sheet (portrait)
pub const SHEET: SizeMm = SizeMm::new(100.0, 148.0);

/// Printer-safe margin around the sheet
pub const SHEET_MARGIN_MM: f32 = 2.0;

/// Gap between trim boxes on the four-up sheet (two bleed widths)
pub const TILE_GAP_MM: f32 = 4.0;

/// Gap between panels in editor previews
pub const PREVIEW_GAP_MM: f32 = 2.0;

/// Vertical gap between bleed boxes on the CD sheet
pub const CD_STACK_GAP_MM: f32 = 2.0;

/// Safe inset applied around a whole back strip
pub const GROUP_SAFE_INSET_MM: f32 = 3.0;

/// Fine export offset applied to every image
pub const EXPORT_NUDGE: OffsetMm = OffsetMm::new(0.0, 0.0);

/// Overscan compensation measured on the kiosk printer
pub const PRINT_CALIBRATION: PrintCalibration = PrintCalibration {
    scale_x: 0.95,
    scale_y: 0.95,
};

// =============================================================================
// Panels
// =============================================================================

/// Outline of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelShape {
    Rect,
    /// Width and height are the diameter
    Circle,
}

/// Geometry of one panel kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub trim: SizeMm,
    pub bleed: SizeMm,
    pub safe: SizeMm,
    /// Crop window the image is clipped to
    pub viewport: SizeMm,
    pub shape: PanelShape,
    /// Center hole (discs only)
    pub hole_diameter_mm: Option<f32>,
}

impl PanelGeometry {
    const fn rect(trim: SizeMm, bleed: SizeMm, safe: SizeMm, viewport: SizeMm) -> Self {
        Self {
            trim,
            bleed,
            safe,
            viewport,
            shape: PanelShape::Rect,
            hole_diameter_mm: None,
        }
    }
}

/// Every printable panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelKind {
    #[serde(rename = "cd-disc", alias = "disc")]
    Disc,
    #[serde(rename = "case-front")]
    CaseFront,
    #[serde(rename = "case-back")]
    CaseBack,
    #[serde(rename = "cd-front-left", alias = "front-left")]
    FrontLeft,
    #[serde(rename = "cd-front-right", alias = "front-right")]
    FrontRight,
    #[serde(rename = "cd-back-outside", alias = "back-outside")]
    BackOutside,
    #[serde(rename = "cd-spine-1", alias = "spine-1")]
    Spine1,
    #[serde(rename = "cd-spine-2", alias = "spine-2")]
    Spine2,
    #[serde(rename = "cd-spine-3", alias = "spine-3")]
    Spine3,
    #[serde(rename = "cd-back-inside", alias = "back-inside")]
    BackInside,
    #[serde(rename = "4x5-front", alias = "card-front")]
    CardFront,
    #[serde(rename = "4x5-back", alias = "card-back")]
    CardBack,
}

struct PanelRow {
    kind: PanelKind,
    label: &'static str,
    geometry: PanelGeometry,
}

const CASE_FRONT: PanelGeometry = PanelGeometry::rect(
    SizeMm::square(40.0),
    SizeMm::square(44.0),
    SizeMm::square(34.0),
    SizeMm::square(40.0),
);

const FRONT_PANEL: PanelGeometry = PanelGeometry::rect(
    SizeMm::square(40.0),
    SizeMm::square(40.0),
    SizeMm::square(34.0),
    SizeMm::square(40.0),
);

const SPINE: PanelGeometry = PanelGeometry::rect(
    SizeMm::new(5.0, 37.0),
    SizeMm::new(5.0, 37.0),
    SizeMm::new(5.0, 31.0),
    SizeMm::new(5.0, 37.0),
);

const CARD: PanelGeometry = PanelGeometry::rect(
    SizeMm::new(40.0, 50.0),
    SizeMm::new(44.0, 54.0),
    SizeMm::new(35.0, 45.0),
    SizeMm::new(35.0, 45.0),
);

/// Indexed by `PanelKind as usize`
const PANEL_TABLE: [PanelRow; 12] = [
    PanelRow {
        kind: PanelKind::Disc,
        label: "Disc",
        geometry: PanelGeometry {
            trim: SizeMm::square(40.0),
            bleed: SizeMm::square(44.0),
            safe: SizeMm::square(34.0),
            viewport: SizeMm::square(40.0),
            shape: PanelShape::Circle,
            hole_diameter_mm: Some(5.5),
        },
    },
    PanelRow {
        kind: PanelKind::CaseFront,
        label: "Case front",
        geometry: CASE_FRONT,
    },
    PanelRow {
        kind: PanelKind::CaseBack,
        label: "Case back",
        geometry: PanelGeometry::rect(
            SizeMm::new(49.0, 37.0),
            SizeMm::new(53.0, 41.0),
            SizeMm::new(43.0, 31.0),
            SizeMm::new(49.0, 37.0),
        ),
    },
    PanelRow {
        kind: PanelKind::FrontLeft,
        label: "Front left",
        geometry: FRONT_PANEL,
    },
    PanelRow {
        kind: PanelKind::FrontRight,
        label: "Front right",
        geometry: FRONT_PANEL,
    },
    PanelRow {
        kind: PanelKind::BackOutside,
        label: "Back outside",
        geometry: PanelGeometry::rect(
            SizeMm::new(49.0, 37.0),
            SizeMm::new(49.0, 37.0),
            SizeMm::new(43.0, 31.0),
            SizeMm::new(49.0, 37.0),
        ),
    },
    PanelRow {
        kind: PanelKind::Spine1,
        label: "Spine 1",
        geometry: SPINE,
    },
    PanelRow {
        kind: PanelKind::Spine2,
        label: "Spine 2",
        geometry: SPINE,
    },
    PanelRow {
        kind: PanelKind::Spine3,
        label: "Spine 3",
        geometry: SPINE,
    },
    PanelRow {
        kind: PanelKind::BackInside,
        label: "Back inside",
        geometry: PanelGeometry::rect(
            SizeMm::new(44.0, 37.0),
            SizeMm::new(44.0, 37.0),
            SizeMm::new(38.0, 31.0),
            SizeMm::new(44.0, 37.0),
        ),
    },
    PanelRow {
        kind: PanelKind::CardFront,
        label: "4x5 front",
        geometry: CARD,
    },
    PanelRow {
        kind: PanelKind::CardBack,
        label: "4x5 back",
        geometry: CARD,
    },
];

impl PanelKind {
    pub const ALL: [PanelKind; 12] = [
        PanelKind::Disc,
        PanelKind::CaseFront,
        PanelKind::CaseBack,
        PanelKind::FrontLeft,
        PanelKind::FrontRight,
        PanelKind::BackOutside,
        PanelKind::Spine1,
        PanelKind::Spine2,
        PanelKind::Spine3,
        PanelKind::BackInside,
        PanelKind::CardFront,
        PanelKind::CardBack,
    ];

    fn row(self) -> &'static PanelRow {
        &PANEL_TABLE[self as usize]
    }

    pub fn geometry(self) -> &'static PanelGeometry {
        &self.row().geometry
    }

    /// Human-readable name used in the UI and in export warnings
    pub fn label(self) -> &'static str {
        self.row().label
    }

    pub fn is_circular(self) -> bool {
        self.geometry().shape == PanelShape::Circle
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_kind_index() {
        for kind in PanelKind::ALL {
            assert_eq!(PANEL_TABLE[kind as usize].kind, kind);
        }
    }

    #[test]
    fn nested_boxes_fit_inside_each_other() {
        for kind in PanelKind::ALL {
            let g = kind.geometry();
            assert!(g.safe.width_mm <= g.trim.width_mm, "{kind}");
            assert!(g.safe.height_mm <= g.trim.height_mm, "{kind}");
            assert!(g.trim.width_mm <= g.bleed.width_mm, "{kind}");
            assert!(g.trim.height_mm <= g.bleed.height_mm, "{kind}");
            assert!(g.viewport.width_mm <= g.trim.width_mm, "{kind}");
        }
    }
}
