//! Staff tooling: scanned payload collection and the per-session store
//!
//! The store is injected; the kiosk keeps it in memory, the CLI persists it
//! to a JSON file between invocations.

use crate::codec::{CdPayload, FourByFivePayload, Payload, decode_scanned};
use crate::input::{classify_paste, is_image_reference};
use crate::panel::Layout;
use crate::sheet::SheetKind;
use crate::types::{KeyprintError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const FOUR_UP_KEY: &str = "staff.fourup";
pub const CD_KEY: &str = "staff.cd";

/// Slots on a four-up sheet
pub const FOUR_UP_CAPACITY: usize = 4;

/// Fewest 4x5 codes worth printing a four-up sheet for
pub const FOUR_UP_MINIMUM: usize = 2;

// =============================================================================
// Key-value stores
// =============================================================================

/// String key-value storage scoped to one staff session
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Memory store mirrored to a JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the file, starting empty when it does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let values = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                KeyprintError::Store(format!("{} is not a session file: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub async fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.values)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

// =============================================================================
// Session
// =============================================================================

/// Typed view over the staff keys of a store
#[derive(Debug, Clone, Default)]
pub struct StaffSession<S> {
    store: S,
}

impl<S: KeyValueStore> StaffSession<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn set_four_up(&mut self, payloads: &[FourByFivePayload]) -> Result<()> {
        self.store.set(FOUR_UP_KEY, serde_json::to_string(payloads)?);
        Ok(())
    }

    /// Stored 4x5 payloads; unreadable entries count as absent
    pub fn four_up(&self) -> Option<Vec<FourByFivePayload>> {
        let raw = self.store.get(FOUR_UP_KEY)?;
        serde_json::from_str(&raw)
            .map_err(|e| log::warn!("Ignoring unreadable {FOUR_UP_KEY}: {e}"))
            .ok()
    }

    pub fn clear_four_up(&mut self) {
        self.store.remove(FOUR_UP_KEY);
    }

    pub fn set_cd(&mut self, payload: &CdPayload) -> Result<()> {
        self.store.set(CD_KEY, serde_json::to_string(payload)?);
        Ok(())
    }

    pub fn cd(&self) -> Option<CdPayload> {
        let raw = self.store.get(CD_KEY)?;
        serde_json::from_str(&raw)
            .map_err(|e| log::warn!("Ignoring unreadable {CD_KEY}: {e}"))
            .ok()
    }

    pub fn clear_cd(&mut self) {
        self.store.remove(CD_KEY);
    }
}

// =============================================================================
// Scan collection
// =============================================================================

/// Result of feeding one scan to the collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// New 4x5 code; `count` codes collected so far
    AddedFourUp { count: usize },
    /// CD code stored (replaces any earlier one)
    AddedCd,
    /// Same front image was already collected
    Duplicate,
    /// Four-up sheet already full
    Full,
}

/// Accumulates scanned codes until staff hands them off to a sheet
#[derive(Debug, Clone, Default)]
pub struct ScanCollector {
    four_up: Vec<FourByFivePayload>,
    cd: Option<CdPayload>,
}

impl ScanCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from what a session already holds
    pub fn from_session<S: KeyValueStore>(session: &StaffSession<S>) -> Self {
        Self {
            four_up: session.four_up().unwrap_or_default(),
            cd: session.cd(),
        }
    }

    /// Decode scanned text and add it. Decode failures are input errors and
    /// leave the collection untouched.
    pub fn add_scanned(&mut self, text: &str) -> Result<ScanOutcome> {
        let payload = decode_scanned(text)?;
        Ok(self.add(payload))
    }

    /// Scan box entry: a share code, or failing that a bare photo link
    pub fn add_entry(&mut self, text: &str) -> Result<ScanOutcome> {
        match decode_scanned(text) {
            Ok(payload) => Ok(self.add(payload)),
            Err(e) if !text.contains("data=") && is_image_reference(text.trim()) => {
                log::debug!("Not a share code ({e}), collecting as a photo link");
                self.add_image_url(text)
            }
            Err(e) => Err(e),
        }
    }

    /// Collect a 4x5 card straight from a photo link, the same image on
    /// both sides with identity transforms
    pub fn add_image_url(&mut self, text: &str) -> Result<ScanOutcome> {
        let reference = classify_paste(text)?;
        let layout = Layout::four_by_five_from_url(reference);
        Ok(self.add(Payload::from_layout(&layout)))
    }

    pub fn add(&mut self, payload: Payload) -> ScanOutcome {
        match payload {
            Payload::Cd(cd) => {
                self.cd = Some(cd);
                ScanOutcome::AddedCd
            }
            Payload::FourByFive(p) => {
                let image = p.front.img.as_deref();
                if image.is_some() && self.four_up.iter().any(|q| q.front.img.as_deref() == image)
                {
                    return ScanOutcome::Duplicate;
                }
                if self.four_up.len() >= FOUR_UP_CAPACITY {
                    return ScanOutcome::Full;
                }
                self.four_up.push(p);
                ScanOutcome::AddedFourUp {
                    count: self.four_up.len(),
                }
            }
        }
    }

    pub fn four_up(&self) -> &[FourByFivePayload] {
        &self.four_up
    }

    pub fn cd(&self) -> Option<&CdPayload> {
        self.cd.as_ref()
    }

    pub fn clear(&mut self) {
        self.four_up.clear();
        self.cd = None;
    }

    /// Sheet this collection is ready for: a CD code wins, otherwise at
    /// least two 4x5 codes are needed
    pub fn ready_sheet(&self) -> Option<SheetKind> {
        if self.cd.is_some() {
            Some(SheetKind::Cd)
        } else if self.four_up.len() >= FOUR_UP_MINIMUM {
            Some(SheetKind::FourUp)
        } else {
            None
        }
    }

    /// Write the collection into the session for the sheet screen
    pub fn handoff<S: KeyValueStore>(&self, session: &mut StaffSession<S>) -> Result<SheetKind> {
        let kind = self.ready_sheet().ok_or_else(|| {
            KeyprintError::InvalidInput(format!(
                "Scan one CD code or at least {FOUR_UP_MINIMUM} 4x5 codes"
            ))
        })?;
        match kind {
            SheetKind::Cd => {
                if let Some(cd) = &self.cd {
                    session.set_cd(cd)?;
                }
            }
            SheetKind::FourUp => session.set_four_up(&self.four_up)?,
        }
        log::info!("Handing off {:?} sheet", kind);
        Ok(kind)
    }
}
