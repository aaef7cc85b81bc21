//! Print sheet plans: an arrangement plus the record for each of its slots

use crate::codec::{CdPayload, FourByFivePayload};
use crate::layout::{Arrangement, SheetLayout, arrange};
use crate::panel::{Layout, PanelRecord, PanelSource};
use crate::staff::{KeyValueStore, StaffSession};
use crate::types::{KeyprintError, Result};

/// Print sheets staff can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    /// Up to four 4x5 fronts on one sheet
    FourUp,
    /// Disc, case front and case back of one CD
    Cd,
}

impl SheetKind {
    pub fn arrangement(self) -> Arrangement {
        match self {
            SheetKind::FourUp => Arrangement::FourUpSheet,
            SheetKind::Cd => Arrangement::CdSheet,
        }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            SheetKind::FourUp => "four-up",
            SheetKind::Cd => "cd-sheet",
        }
    }
}

/// Read-only sheet assembled from scanned payloads or an editing layout
#[derive(Debug, Clone)]
pub struct SheetPlan {
    arrangement: Arrangement,
    records: Vec<(String, PanelRecord)>,
    labels: Vec<(String, String)>,
}

impl SheetPlan {
    /// Plan from explicit slot records; unknown slots are rejected
    pub fn new(arrangement: Arrangement, records: Vec<(String, PanelRecord)>) -> Result<Self> {
        let mut normalized = Vec::with_capacity(records.len());
        for (key, mut record) in records {
            let kind = arrangement.kind_of(&key).ok_or_else(|| {
                KeyprintError::Layout(format!("Arrangement {arrangement:?} has no slot '{key}'"))
            })?;
            record.kind = kind;
            normalized.push((key, record));
        }
        Ok(Self {
            arrangement,
            records: normalized,
            labels: Vec::new(),
        })
    }

    /// Four-up sheet from the fronts of up to four 4x5 payloads
    pub fn four_up(payloads: &[FourByFivePayload]) -> Result<Self> {
        if payloads.is_empty() {
            return Err(KeyprintError::InvalidInput(
                "No 4x5 codes collected".to_string(),
            ));
        }
        if payloads.len() > 4 {
            log::warn!("{} 4x5 codes collected, printing the first 4", payloads.len());
        }
        let keys: Vec<&str> = Arrangement::FourUpSheet.keys().collect();
        let records = payloads
            .iter()
            .zip(&keys)
            .map(|(p, key)| (key.to_string(), p.front.to_record(p.front.part)))
            .collect();
        let mut plan = Self::new(Arrangement::FourUpSheet, records)?;
        plan.labels = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.to_string(), format!("Card {}", i + 1)))
            .collect();
        Ok(plan)
    }

    /// CD sheet from one CD payload's disc and front/back faces
    pub fn cd(payload: &CdPayload) -> Result<Self> {
        let records = vec![
            ("disc".to_string(), payload.disc.to_record(payload.disc.part)),
            ("case-front".to_string(), payload.front.to_record(payload.front.part)),
            ("case-back".to_string(), payload.back.to_record(payload.back.part)),
        ];
        Self::new(Arrangement::CdSheet, records)
    }

    /// Plan for the sheet kind from what a staff session collected
    pub fn from_session<S: KeyValueStore>(
        session: &StaffSession<S>,
        kind: SheetKind,
    ) -> Result<Self> {
        match kind {
            SheetKind::FourUp => {
                let payloads = session.four_up().ok_or_else(|| {
                    KeyprintError::InvalidInput("No 4x5 codes in this session".to_string())
                })?;
                Self::four_up(&payloads)
            }
            SheetKind::Cd => {
                let payload = session.cd().ok_or_else(|| {
                    KeyprintError::InvalidInput("No CD code in this session".to_string())
                })?;
                Self::cd(&payload)
            }
        }
    }

    /// Preview plan for one arrangement of an editing layout
    pub fn for_layout(layout: &Layout, arrangement: Arrangement) -> Result<Self> {
        let records = arrangement
            .keys()
            .filter_map(|key| layout.get(key).map(|r| (key.to_string(), r.clone())))
            .collect();
        Self::new(arrangement, records)
    }

    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    /// Layout of the slots that hold a record
    pub fn sheet_layout(&self) -> SheetLayout {
        arrange(self.arrangement, |key| self.panel(key).is_some())
    }

    /// Name used when reporting on a slot
    pub fn label(&self, key: &str) -> String {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, l)| l.clone())
            .or_else(|| self.panel(key).map(|r| r.kind.label().to_string()))
            .unwrap_or_else(|| key.to_string())
    }

    pub fn records(&self) -> impl Iterator<Item = (&str, &PanelRecord)> {
        self.records.iter().map(|(k, r)| (k.as_str(), r))
    }
}

impl PanelSource for SheetPlan {
    fn panel(&self, key: &str) -> Option<&PanelRecord> {
        self.records.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }
}
