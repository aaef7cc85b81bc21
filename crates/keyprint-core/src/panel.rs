//! Templates, panel records and the editable layout

use crate::layout::Arrangement;
use crate::specs::PanelKind;
use crate::transform::ImageTransform;
use crate::types::{KeyprintError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Templates
// =============================================================================

/// Product templates a participant can edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Template {
    #[serde(rename = "4x5")]
    FourByFive,
    #[serde(rename = "cd3-simple")]
    Cd3Simple,
    #[serde(rename = "cd3-panel")]
    Cd3Panel,
}

const FOUR_BY_FIVE_KEYS: [(&str, PanelKind); 2] = [
    ("front", PanelKind::CardFront),
    ("back", PanelKind::CardBack),
];

const CD3_SIMPLE_KEYS: [(&str, PanelKind); 3] = [
    ("disc", PanelKind::Disc),
    ("case-front", PanelKind::CaseFront),
    ("case-back", PanelKind::CaseBack),
];

const CD3_PANEL_KEYS: [(&str, PanelKind); 8] = [
    ("disc", PanelKind::Disc),
    ("front-left", PanelKind::FrontLeft),
    ("front-right", PanelKind::FrontRight),
    ("back-outside", PanelKind::BackOutside),
    ("spine-1", PanelKind::Spine1),
    ("spine-2", PanelKind::Spine2),
    ("spine-3", PanelKind::Spine3),
    ("back-inside", PanelKind::BackInside),
];

impl Template {
    pub const ALL: [Template; 3] = [Template::FourByFive, Template::Cd3Simple, Template::Cd3Panel];

    /// Canonical panel keys with their kinds, in display order
    pub fn slots(self) -> &'static [(&'static str, PanelKind)] {
        match self {
            Template::FourByFive => &FOUR_BY_FIVE_KEYS,
            Template::Cd3Simple => &CD3_SIMPLE_KEYS,
            Template::Cd3Panel => &CD3_PANEL_KEYS,
        }
    }

    pub fn keys(self) -> impl Iterator<Item = &'static str> {
        self.slots().iter().map(|(k, _)| *k)
    }

    pub fn kind_of(self, key: &str) -> Option<PanelKind> {
        self.slots().iter().find(|(k, _)| *k == key).map(|(_, kind)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Template::FourByFive => "4x5",
            Template::Cd3Simple => "cd3-simple",
            Template::Cd3Panel => "cd3-panel",
        }
    }

    /// Path of the participant edit page a share link points to
    pub fn edit_path(self) -> &'static str {
        match self {
            Template::FourByFive => "/p/4x5/edit",
            Template::Cd3Simple | Template::Cd3Panel => "/p/cd/edit",
        }
    }

    /// Arrangements shown while editing, one per group
    pub fn preview_arrangements(self) -> &'static [Arrangement] {
        match self {
            Template::FourByFive => &[Arrangement::CardPair],
            Template::Cd3Simple => &[Arrangement::CdSheet],
            Template::Cd3Panel => &[
                Arrangement::Disc,
                Arrangement::FrontPair,
                Arrangement::BackStrip,
            ],
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = KeyprintError;

    fn from_str(s: &str) -> Result<Self> {
        Template::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| KeyprintError::InvalidInput(format!("Unknown template '{s}'")))
    }
}

/// Panel groups of the CD panel template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelGroup {
    Disc,
    Front,
    Back,
}

impl PanelGroup {
    pub const ALL: [PanelGroup; 3] = [PanelGroup::Disc, PanelGroup::Front, PanelGroup::Back];

    pub fn keys(self) -> &'static [&'static str] {
        match self {
            PanelGroup::Disc => &["disc"],
            PanelGroup::Front => &["front-left", "front-right"],
            PanelGroup::Back => &["back-outside", "spine-1", "spine-2", "spine-3", "back-inside"],
        }
    }

    pub fn arrangement(self) -> Arrangement {
        match self {
            PanelGroup::Disc => Arrangement::Disc,
            PanelGroup::Front => Arrangement::FrontPair,
            PanelGroup::Back => Arrangement::BackStrip,
        }
    }

    pub fn of_key(key: &str) -> Option<PanelGroup> {
        PanelGroup::ALL.into_iter().find(|g| g.keys().contains(&key))
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelGroup::Disc => "Disc",
            PanelGroup::Front => "Front",
            PanelGroup::Back => "Back",
        }
    }
}

// =============================================================================
// Panel records
// =============================================================================

/// Editable state of one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRecord {
    pub kind: PanelKind,
    /// `http(s)://` URL or `data:` URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_height: Option<u32>,
    #[serde(default)]
    pub transform: ImageTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl PanelRecord {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            image_ref: None,
            natural_width: None,
            natural_height: None,
            transform: ImageTransform::IDENTITY,
            background_color: None,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn natural_size(&self) -> Option<(u32, u32)> {
        match (self.natural_width, self.natural_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_ref.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Anything that can hand out panel records by slot key
pub trait PanelSource {
    fn panel(&self, key: &str) -> Option<&PanelRecord>;
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PanelEntry {
    key: String,
    #[serde(flatten)]
    record: PanelRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LayoutRepr {
    template: Template,
    panels: Vec<PanelEntry>,
}

/// Ordered panel key to record mapping; the key set is always exactly the
/// template's canonical set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutRepr", into = "LayoutRepr")]
pub struct Layout {
    template: Template,
    panels: Vec<(String, PanelRecord)>,
}

impl Layout {
    /// Blank layout with identity transforms
    pub fn new(template: Template) -> Self {
        Self {
            template,
            panels: template
                .slots()
                .iter()
                .map(|(key, kind)| (key.to_string(), PanelRecord::new(*kind)))
                .collect(),
        }
    }

    /// 4x5 layout with the same image on both sides
    pub fn four_by_five_from_url(image_ref: impl Into<String>) -> Self {
        let image_ref = image_ref.into();
        let mut layout = Self::new(Template::FourByFive);
        for (_, record) in &mut layout.panels {
            record.image_ref = Some(image_ref.clone());
        }
        layout
    }

    /// Build from explicit records, checking key completeness and kinds
    pub fn from_panels(template: Template, panels: Vec<(String, PanelRecord)>) -> Result<Self> {
        if panels.len() != template.slots().len() {
            return Err(KeyprintError::Layout(format!(
                "Template {} needs {} panels, got {}",
                template,
                template.slots().len(),
                panels.len()
            )));
        }
        let mut ordered = Vec::with_capacity(panels.len());
        for (key, kind) in template.slots() {
            let record = panels
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, r)| r.clone())
                .ok_or_else(|| {
                    KeyprintError::Layout(format!("Template {template} is missing panel '{key}'"))
                })?;
            if record.kind != *kind {
                return Err(KeyprintError::Layout(format!(
                    "Panel '{key}' must be {kind}, got {}",
                    record.kind
                )));
            }
            ordered.push((key.to_string(), record));
        }
        Ok(Self {
            template,
            panels: ordered,
        })
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn get(&self, key: &str) -> Option<&PanelRecord> {
        self.panels.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PanelRecord> {
        self.panels
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, r)| r)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.panels.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PanelRecord)> {
        self.panels.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PanelRecord)> {
        self.panels.iter_mut().map(|(k, r)| (k.as_str(), r))
    }

    /// All records in key order, as stored in history
    pub fn snapshot(&self) -> Vec<PanelRecord> {
        self.panels.iter().map(|(_, r)| r.clone()).collect()
    }

    /// Restore records from a snapshot taken on this layout
    pub fn restore(&mut self, snapshot: &[PanelRecord]) {
        for ((_, record), saved) in self.panels.iter_mut().zip(snapshot) {
            *record = saved.clone();
        }
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.panels.iter().position(|(k, _)| k == key)
    }
}

impl PanelSource for Layout {
    fn panel(&self, key: &str) -> Option<&PanelRecord> {
        self.get(key)
    }
}

impl TryFrom<LayoutRepr> for Layout {
    type Error = KeyprintError;

    fn try_from(repr: LayoutRepr) -> Result<Self> {
        let panels = repr
            .panels
            .into_iter()
            .map(|e| (e.key, e.record))
            .collect();
        Layout::from_panels(repr.template, panels)
    }
}

impl From<Layout> for LayoutRepr {
    fn from(layout: Layout) -> Self {
        LayoutRepr {
            template: layout.template,
            panels: layout
                .panels
                .into_iter()
                .map(|(key, record)| PanelEntry { key, record })
                .collect(),
        }
    }
}
