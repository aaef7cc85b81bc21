//! Wire shape of a shared layout
//!
//! Field names follow the published link format (`tpl`, `tx`, `imgWidth`,
//! ...), which together with the lz-string token keeps printed codes
//! decoding.

use crate::panel::{Layout, PanelRecord, Template};
use crate::specs::PanelKind;
use crate::transform::{ImageTransform, clamp_scale};
use crate::types::{KeyprintError, Result};
use serde::{Deserialize, Serialize};

/// Only version understood by this build
pub const PAYLOAD_VERSION: u8 = 1;

/// One panel on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartSpec {
    pub part: PanelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub tx: f32,
    #[serde(default)]
    pub ty: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub rot: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl PartSpec {
    pub fn from_record(record: &PanelRecord) -> Self {
        Self {
            part: record.kind,
            img: record.image_ref.clone(),
            img_width: record.natural_width,
            img_height: record.natural_height,
            bg_color: record.background_color.clone(),
            tx: record.transform.translate_x_mm,
            ty: record.transform.translate_y_mm,
            scale: record.transform.scale,
            rot: record.transform.rotation_deg,
        }
    }

    /// Record for a slot of `kind`; the slot decides the kind, not `part`
    pub fn to_record(&self, kind: PanelKind) -> PanelRecord {
        if self.part != kind {
            log::debug!("Part {:?} decoded into a {:?} slot", self.part, kind);
        }
        PanelRecord {
            kind,
            image_ref: self.img.clone().filter(|s| !s.is_empty()),
            natural_width: self.img_width,
            natural_height: self.img_height,
            transform: ImageTransform {
                translate_x_mm: finite_or_zero(self.tx),
                translate_y_mm: finite_or_zero(self.ty),
                scale: clamp_scale(self.scale),
                rotation_deg: finite_or_zero(self.rot),
            },
            background_color: self.bg_color.clone(),
        }
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FourByFivePayload {
    pub v: u8,
    pub front: PartSpec,
    pub back: PartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontPanels {
    pub left: PartSpec,
    pub right: PartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackPanels {
    pub outside: PartSpec,
    pub spine1: PartSpec,
    pub spine2: PartSpec,
    pub spine3: PartSpec,
    pub inside: PartSpec,
}

/// CD payload. `front`/`back` are always filled so older decoders that only
/// know the simple case still find a usable image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdPayload {
    pub v: u8,
    pub disc: PartSpec,
    pub front: PartSpec,
    pub back: PartSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_panels: Option<FrontPanels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_panels: Option<BackPanels>,
}

/// A decoded share payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tpl")]
pub enum Payload {
    #[serde(rename = "4x5")]
    FourByFive(FourByFivePayload),
    #[serde(rename = "cd", alias = "cd3")]
    Cd(CdPayload),
}

impl Payload {
    pub fn version(&self) -> u8 {
        match self {
            Payload::FourByFive(p) => p.v,
            Payload::Cd(p) => p.v,
        }
    }

    /// Wire tag
    pub fn tag(&self) -> &'static str {
        match self {
            Payload::FourByFive(_) => "4x5",
            Payload::Cd(_) => "cd",
        }
    }

    pub fn template(&self) -> Template {
        match self {
            Payload::FourByFive(_) => Template::FourByFive,
            Payload::Cd(p) if p.front_panels.is_some() || p.back_panels.is_some() => {
                Template::Cd3Panel
            }
            Payload::Cd(_) => Template::Cd3Simple,
        }
    }

    /// Image on the front face, used to recognise repeat scans
    pub fn front_image(&self) -> Option<&str> {
        match self {
            Payload::FourByFive(p) => p.front.img.as_deref(),
            Payload::Cd(p) => p.front.img.as_deref(),
        }
    }

    pub fn from_layout(layout: &Layout) -> Self {
        let part = |key: &str| {
            layout
                .get(key)
                .map(PartSpec::from_record)
                .unwrap_or_else(|| {
                    PartSpec::from_record(&PanelRecord::new(
                        layout.template().kind_of(key).unwrap_or(PanelKind::CardFront),
                    ))
                })
        };

        match layout.template() {
            Template::FourByFive => Payload::FourByFive(FourByFivePayload {
                v: PAYLOAD_VERSION,
                front: part("front"),
                back: part("back"),
            }),
            Template::Cd3Simple => Payload::Cd(CdPayload {
                v: PAYLOAD_VERSION,
                disc: part("disc"),
                front: part("case-front"),
                back: part("case-back"),
                front_panels: None,
                back_panels: None,
            }),
            Template::Cd3Panel => Payload::Cd(CdPayload {
                v: PAYLOAD_VERSION,
                disc: part("disc"),
                front: part("front-left"),
                back: part("back-outside"),
                front_panels: Some(FrontPanels {
                    left: part("front-left"),
                    right: part("front-right"),
                }),
                back_panels: Some(BackPanels {
                    outside: part("back-outside"),
                    spine1: part("spine-1"),
                    spine2: part("spine-2"),
                    spine3: part("spine-3"),
                    inside: part("back-inside"),
                }),
            }),
        }
    }

    /// Rebuild the editable layout.
    ///
    /// A CD payload with only one of `frontPanels`/`backPanels` fills the
    /// missing group from the `front`/`back` fallbacks.
    pub fn to_layout(&self) -> Result<Layout> {
        if self.version() != PAYLOAD_VERSION {
            return Err(KeyprintError::InvalidPayload(format!(
                "Unsupported payload version {}",
                self.version()
            )));
        }
        let template = self.template();
        let parts: Vec<(&str, &PartSpec)> = match self {
            Payload::FourByFive(p) => vec![("front", &p.front), ("back", &p.back)],
            Payload::Cd(p) if template == Template::Cd3Simple => vec![
                ("disc", &p.disc),
                ("case-front", &p.front),
                ("case-back", &p.back),
            ],
            Payload::Cd(p) => {
                let mut parts = vec![("disc", &p.disc)];
                match &p.front_panels {
                    Some(f) => parts.extend([("front-left", &f.left), ("front-right", &f.right)]),
                    None => parts.extend([("front-left", &p.front), ("front-right", &p.front)]),
                }
                match &p.back_panels {
                    Some(b) => parts.extend([
                        ("back-outside", &b.outside),
                        ("spine-1", &b.spine1),
                        ("spine-2", &b.spine2),
                        ("spine-3", &b.spine3),
                        ("back-inside", &b.inside),
                    ]),
                    None => parts.extend([
                        ("back-outside", &p.back),
                        ("spine-1", &p.back),
                        ("spine-2", &p.back),
                        ("spine-3", &p.back),
                        ("back-inside", &p.back),
                    ]),
                }
                parts
            }
        };

        let panels = parts
            .into_iter()
            .map(|(key, spec)| {
                let kind = template.kind_of(key).ok_or_else(|| {
                    KeyprintError::InvalidPayload(format!("Unknown panel '{key}'"))
                })?;
                Ok((key.to_string(), spec.to_record(kind)))
            })
            .collect::<Result<Vec<_>>>()?;

        Layout::from_panels(template, panels)
    }
}
