//! Arrangement calculation
//!
//! Each arrangement is a fixed list of slots. Slots are either pinned to
//! absolute offsets (absent panels leave a hole, nothing shifts) or packed
//! left to right (absent panels are skipped and the strip shrinks).

use crate::specs::{
    CD_STACK_GAP_MM, GROUP_SAFE_INSET_MM, PREVIEW_GAP_MM, PanelKind, SHEET, SHEET_MARGIN_MM,
    TILE_GAP_MM,
};

use super::{GroupGuides, PanelPlacement, Rect, SheetLayout};

// =============================================================================
// Arrangements
// =============================================================================

/// Named ways of putting panels next to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arrangement {
    /// 4x5 editor: front and back cards side by side
    CardPair,
    /// A disc on its own
    Disc,
    /// Case front, left and right panels
    FrontPair,
    /// Case back preview: outside, three spines, inside with preview gaps
    BackStrip,
    /// Case back as printed and folded: panels edge to edge
    BackFoldStrip,
    /// 100x148 sheet with four 4x5 cards in a 2x2 grid
    FourUpSheet,
    /// 100x148 sheet with disc, case front and case back stacked
    CdSheet,
}

/// How slots are positioned
#[derive(Debug, Clone, Copy, PartialEq)]
enum Policy {
    /// Absolute bleed-box offsets; fixed overall size
    Pinned { width_mm: f32, height_mm: f32 },
    /// Packed horizontally with a gap; size is the sum over present panels
    Packed { gap_mm: f32 },
}

struct Slot {
    key: &'static str,
    kind: PanelKind,
    /// Bleed-box origin (ignored for packed arrangements)
    x: f32,
    y: f32,
}

const fn slot(key: &'static str, kind: PanelKind, x: f32, y: f32) -> Slot {
    Slot { key, kind, x, y }
}

const fn packed(key: &'static str, kind: PanelKind) -> Slot {
    slot(key, kind, 0.0, 0.0)
}

// Card bleed is 2mm wider than trim on each side, so with a 4mm tile gap
// neighbouring bleed boxes touch exactly.
const CARD_BLEED_PITCH_X: f32 = 40.0 + TILE_GAP_MM;
const CARD_BLEED_PITCH_Y: f32 = 50.0 + TILE_GAP_MM;
const CARD_BLEED_ORIGIN: f32 = SHEET_MARGIN_MM - 2.0;

const FOUR_UP_SLOTS: [Slot; 4] = [
    slot("a", PanelKind::CardFront, CARD_BLEED_ORIGIN, CARD_BLEED_ORIGIN),
    slot(
        "b",
        PanelKind::CardFront,
        CARD_BLEED_ORIGIN + CARD_BLEED_PITCH_X,
        CARD_BLEED_ORIGIN,
    ),
    slot(
        "c",
        PanelKind::CardFront,
        CARD_BLEED_ORIGIN,
        CARD_BLEED_ORIGIN + CARD_BLEED_PITCH_Y,
    ),
    slot(
        "d",
        PanelKind::CardFront,
        CARD_BLEED_ORIGIN + CARD_BLEED_PITCH_X,
        CARD_BLEED_ORIGIN + CARD_BLEED_PITCH_Y,
    ),
];

const CD_SHEET_SLOTS: [Slot; 3] = [
    slot("disc", PanelKind::Disc, SHEET_MARGIN_MM, SHEET_MARGIN_MM),
    slot(
        "case-front",
        PanelKind::CaseFront,
        SHEET_MARGIN_MM,
        SHEET_MARGIN_MM + 44.0 + CD_STACK_GAP_MM,
    ),
    slot(
        "case-back",
        PanelKind::CaseBack,
        SHEET_MARGIN_MM,
        SHEET_MARGIN_MM + 2.0 * (44.0 + CD_STACK_GAP_MM),
    ),
];

const CARD_PAIR_SLOTS: [Slot; 2] = [
    slot("front", PanelKind::CardFront, 0.0, 0.0),
    slot("back", PanelKind::CardBack, 44.0 + PREVIEW_GAP_MM, 0.0),
];

const DISC_SLOTS: [Slot; 1] = [slot("disc", PanelKind::Disc, 0.0, 0.0)];

const FRONT_PAIR_SLOTS: [Slot; 2] = [
    slot("front-left", PanelKind::FrontLeft, 0.0, 0.0),
    slot("front-right", PanelKind::FrontRight, 40.0 + PREVIEW_GAP_MM, 0.0),
];

const BACK_SLOTS: [Slot; 5] = [
    packed("back-outside", PanelKind::BackOutside),
    packed("spine-1", PanelKind::Spine1),
    packed("spine-2", PanelKind::Spine2),
    packed("spine-3", PanelKind::Spine3),
    packed("back-inside", PanelKind::BackInside),
];

impl Arrangement {
    fn slots(self) -> &'static [Slot] {
        match self {
            Arrangement::CardPair => &CARD_PAIR_SLOTS,
            Arrangement::Disc => &DISC_SLOTS,
            Arrangement::FrontPair => &FRONT_PAIR_SLOTS,
            Arrangement::BackStrip | Arrangement::BackFoldStrip => &BACK_SLOTS,
            Arrangement::FourUpSheet => &FOUR_UP_SLOTS,
            Arrangement::CdSheet => &CD_SHEET_SLOTS,
        }
    }

    fn policy(self) -> Policy {
        match self {
            Arrangement::CardPair => Policy::Pinned {
                width_mm: 44.0 * 2.0 + PREVIEW_GAP_MM,
                height_mm: 54.0,
            },
            Arrangement::Disc => Policy::Pinned {
                width_mm: 44.0,
                height_mm: 44.0,
            },
            Arrangement::FrontPair => Policy::Pinned {
                width_mm: 40.0 * 2.0 + PREVIEW_GAP_MM,
                height_mm: 40.0,
            },
            Arrangement::BackStrip => Policy::Packed {
                gap_mm: PREVIEW_GAP_MM,
            },
            Arrangement::BackFoldStrip => Policy::Packed { gap_mm: 0.0 },
            Arrangement::FourUpSheet | Arrangement::CdSheet => Policy::Pinned {
                width_mm: SHEET.width_mm,
                height_mm: SHEET.height_mm,
            },
        }
    }

    /// Slot keys in drawing order
    pub fn keys(self) -> impl Iterator<Item = &'static str> {
        self.slots().iter().map(|s| s.key)
    }

    /// Panel kind expected in a slot
    pub fn kind_of(self, key: &str) -> Option<PanelKind> {
        self.slots().iter().find(|s| s.key == key).map(|s| s.kind)
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Place the present panels of an arrangement.
///
/// `present` decides per slot key whether that panel exists in the layout.
pub fn arrange(arrangement: Arrangement, present: impl Fn(&str) -> bool) -> SheetLayout {
    match arrangement.policy() {
        Policy::Pinned {
            width_mm,
            height_mm,
        } => {
            let placements = arrangement
                .slots()
                .iter()
                .filter(|s| present(s.key))
                .map(|s| PanelPlacement::at(s.key, s.kind, s.x, s.y))
                .collect();
            SheetLayout {
                width_mm,
                height_mm,
                placements,
                fold_lines_x_mm: Vec::new(),
                group_guides: None,
            }
        }
        Policy::Packed { gap_mm } => arrange_packed(arrangement, gap_mm, present),
    }
}

fn arrange_packed(
    arrangement: Arrangement,
    gap_mm: f32,
    present: impl Fn(&str) -> bool,
) -> SheetLayout {
    let mut placements = Vec::new();
    let mut fold_lines_x_mm = Vec::new();
    let mut cursor = 0.0;
    let mut height_mm: f32 = 0.0;

    for s in arrangement.slots().iter().filter(|s| present(s.key)) {
        if !placements.is_empty() {
            if gap_mm == 0.0 {
                fold_lines_x_mm.push(cursor);
            }
            cursor += gap_mm;
        }
        let placement = PanelPlacement::at(s.key, s.kind, cursor, 0.0);
        cursor += placement.bleed.width;
        height_mm = height_mm.max(placement.bleed.height);
        placements.push(placement);
    }

    let group_guides = (arrangement == Arrangement::BackStrip && !placements.is_empty()).then(|| {
        let trim = Rect::new(0.0, 0.0, cursor, height_mm);
        GroupGuides {
            trim,
            safe: trim.inset(GROUP_SAFE_INSET_MM),
        }
    });

    SheetLayout {
        width_mm: cursor,
        height_mm,
        placements,
        fold_lines_x_mm,
        group_guides,
    }
}
