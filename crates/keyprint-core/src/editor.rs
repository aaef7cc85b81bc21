//! Editing session: the single writer of a layout
//!
//! Every discrete action (button, key, drag end) records exactly one history
//! snapshot and publishes a `LayoutChanged` event. Live gesture moves only
//! publish; the snapshot is taken when the last pointer lifts.

use crate::events::{EditorEvent, EventBus};
use crate::gesture::{GestureEngine, GestureUpdate, PointerRelease};
use crate::history::History;
use crate::input::is_image_reference;
use crate::layout::{Arrangement, SheetLayout, arrange};
use crate::panel::{Layout, PanelGroup, PanelRecord, Template};
use crate::transform::{
    ImageTransform, NUDGE_STEP_MM, ZoomDirection, clamp_scale, cover_factor,
};
use crate::types::{KeyprintError, Result};
use tokio::sync::mpsc;

/// Keyboard commands understood by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ZoomIn,
    ZoomOut,
    Undo,
    Redo,
}

impl EditorKey {
    /// Translation for an arrow key.
    ///
    /// Arrows move the image opposite to the arrow, as if moving the
    /// viewport over the photo. Kept as the kiosk behaves today; pending
    /// product confirmation.
    pub fn nudge_offset(self) -> Option<(f32, f32)> {
        match self {
            EditorKey::ArrowUp => Some((0.0, NUDGE_STEP_MM)),
            EditorKey::ArrowDown => Some((0.0, -NUDGE_STEP_MM)),
            EditorKey::ArrowLeft => Some((NUDGE_STEP_MM, 0.0)),
            EditorKey::ArrowRight => Some((-NUDGE_STEP_MM, 0.0)),
            _ => None,
        }
    }
}

pub struct EditorSession {
    layout: Layout,
    history: History<Vec<PanelRecord>>,
    active: String,
    group: Option<PanelGroup>,
    gesture: GestureEngine,
    gesture_key: Option<String>,
    revision: u64,
    events: EventBus,
}

impl EditorSession {
    pub fn new(layout: Layout) -> Self {
        let active = layout.keys().next().unwrap_or_default().to_string();
        let group = match layout.template() {
            Template::Cd3Panel => PanelGroup::of_key(&active),
            _ => None,
        };
        Self {
            history: History::new(layout.snapshot()),
            layout,
            active,
            group,
            gesture: GestureEngine::new(),
            gesture_key: None,
            revision: 0,
            events: EventBus::new(),
        }
    }

    pub fn from_template(template: Template) -> Self {
        Self::new(Layout::new(template))
    }

    /// Replace the gesture engine, e.g. to match the display density
    pub fn with_gesture_engine(mut self, gesture: GestureEngine) -> Self {
        self.gesture = gesture;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn template(&self) -> Template {
        self.layout.template()
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn active_record(&self) -> Option<&PanelRecord> {
        self.layout.get(&self.active)
    }

    pub fn group(&self) -> Option<PanelGroup> {
        self.group
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &History<Vec<PanelRecord>> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EditorEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn set_active(&mut self, key: &str) -> Result<()> {
        if self.layout.get(key).is_none() {
            return Err(KeyprintError::InvalidInput(format!(
                "Template {} has no panel '{key}'",
                self.template()
            )));
        }
        if self.active != key {
            self.active = key.to_string();
            self.events.publish(EditorEvent::ActivePanelChanged {
                key: self.active.clone(),
            });
        }
        if self.template() == Template::Cd3Panel
            && let Some(group) = PanelGroup::of_key(key)
            && self.group != Some(group)
        {
            self.group = Some(group);
            self.events.publish(EditorEvent::GroupChanged { group });
        }
        Ok(())
    }

    /// Switch the visible group of the CD panel template
    pub fn select_group(&mut self, group: PanelGroup) -> Result<()> {
        if self.template() != Template::Cd3Panel {
            return Err(KeyprintError::InvalidInput(format!(
                "Template {} has no panel groups",
                self.template()
            )));
        }
        self.set_active(group.keys()[0])
    }

    /// Arrangement currently on screen
    pub fn arrangement(&self) -> Arrangement {
        match (self.template(), self.group) {
            (Template::Cd3Panel, Some(group)) => group.arrangement(),
            (template, _) => template.preview_arrangements()[0],
        }
    }

    pub fn sheet_layout(&self) -> SheetLayout {
        arrange(self.arrangement(), |key| self.layout.get(key).is_some())
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    pub fn pointer_down(&mut self, id: u64, x: f32, y: f32) {
        if !self.gesture.is_active() {
            self.gesture_key = Some(self.active.clone());
        }
        let Some(key) = self.gesture_key.as_deref() else {
            return;
        };
        if let Some(record) = self.layout.get(key) {
            let transform = record.transform;
            self.gesture.pointer_down(id, x, y, &transform);
        }
    }

    /// Live update; publishes but does not record history
    pub fn pointer_move(&mut self, id: u64, x: f32, y: f32) -> Option<GestureUpdate> {
        let update = self.gesture.pointer_move(id, x, y)?;
        let key = self.gesture_key.clone()?;
        let record = self.layout.get_mut(&key)?;
        record.transform = update.apply(record.transform);
        self.bump(Some(key));
        Some(update)
    }

    /// Release a pointer; the gesture's single snapshot is recorded when the
    /// last pointer lifts and something changed.
    pub fn pointer_up(&mut self, id: u64) -> PointerRelease {
        let release = self.gesture.pointer_up(id);
        if release == PointerRelease::Finished {
            let key = self.gesture_key.take();
            if self.history.current() != &self.layout.snapshot() {
                self.commit(key);
            }
        }
        release
    }

    // =========================================================================
    // Discrete actions
    // =========================================================================

    /// Apply a keyboard command; returns whether it was handled
    pub fn handle_key(&mut self, key: EditorKey) -> bool {
        if let Some((dx, dy)) = key.nudge_offset() {
            self.nudge(dx, dy);
            return true;
        }
        match key {
            EditorKey::ZoomIn => self.zoom(ZoomDirection::In),
            EditorKey::ZoomOut => self.zoom(ZoomDirection::Out),
            EditorKey::Undo => return self.undo(),
            EditorKey::Redo => return self.redo(),
            _ => return false,
        }
        true
    }

    pub fn nudge(&mut self, dx_mm: f32, dy_mm: f32) {
        self.mutate_active(|r| r.transform = r.transform.translated(dx_mm, dy_mm));
    }

    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.mutate_active(|r| r.transform = r.transform.zoomed(direction));
    }

    pub fn reset(&mut self) {
        self.mutate_active(|r| r.transform = ImageTransform::IDENTITY);
    }

    /// Fill the viewport with no letterboxing.
    ///
    /// The cover factor is applied to the contain baseline, so repeating it
    /// is idempotent. Returns `false` (nothing recorded) while the image's
    /// natural size is unknown.
    pub fn cover(&mut self) -> bool {
        let Some(record) = self.active_record() else {
            return false;
        };
        let Some(factor) = cover_factor(record.kind.geometry().viewport, record.natural_size())
        else {
            log::debug!("Cover skipped for '{}': natural size unknown", self.active);
            return false;
        };
        self.mutate_active(|r| {
            r.transform = ImageTransform {
                translate_x_mm: 0.0,
                translate_y_mm: 0.0,
                scale: clamp_scale(factor),
                rotation_deg: r.transform.rotation_deg,
            }
        });
        true
    }

    /// Clear the vertical offset
    pub fn fit_width(&mut self) {
        self.mutate_active(|r| r.transform.translate_y_mm = 0.0);
    }

    /// Clear the horizontal offset
    pub fn fit_height(&mut self) {
        self.mutate_active(|r| r.transform.translate_x_mm = 0.0);
    }

    pub fn center(&mut self) {
        self.mutate_active(|r| {
            r.transform.translate_x_mm = 0.0;
            r.transform.translate_y_mm = 0.0;
        });
    }

    /// Put a new image on the active panel
    pub fn set_image(&mut self, image_ref: &str) -> Result<()> {
        let image_ref = image_ref.trim();
        if !is_image_reference(image_ref) {
            return Err(KeyprintError::InvalidInput(
                "Image must be an http(s) URL or a data URI".to_string(),
            ));
        }
        self.mutate_active(|r| {
            r.image_ref = Some(image_ref.to_string());
            r.natural_width = None;
            r.natural_height = None;
            r.transform.translate_x_mm = 0.0;
            r.transform.translate_y_mm = 0.0;
            r.transform.scale = clamp_scale(r.transform.scale.max(1.0));
        });
        Ok(())
    }

    pub fn set_background_color(&mut self, color: Option<String>) {
        self.mutate_active(|r| r.background_color = color);
    }

    /// Remember an image's pixel size once it has loaded.
    ///
    /// Not a user action: no snapshot is recorded, but stored snapshots that
    /// show the same image learn the size too so undo keeps cover working.
    pub fn record_natural_size(&mut self, key: &str, width: u32, height: u32) {
        let Some(index) = self.layout.index_of(key) else {
            return;
        };
        let Some(record) = self.layout.get_mut(key) else {
            return;
        };
        if record.natural_size().is_some() || width == 0 || height == 0 {
            return;
        }
        record.natural_width = Some(width);
        record.natural_height = Some(height);
        let image_ref = record.image_ref.clone();

        self.history.update_all(|snapshot| {
            if let Some(saved) = snapshot.get_mut(index)
                && saved.image_ref == image_ref
                && saved.natural_size().is_none()
            {
                saved.natural_width = Some(width);
                saved.natural_height = Some(height);
            }
        });
        self.bump(Some(key.to_string()));
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.layout.restore(&snapshot);
        self.after_history_move();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.layout.restore(&snapshot);
        self.after_history_move();
        true
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn mutate_active(&mut self, f: impl FnOnce(&mut PanelRecord)) {
        let key = self.active.clone();
        let Some(record) = self.layout.get_mut(&key) else {
            return;
        };
        f(record);
        self.commit(Some(key));
    }

    fn commit(&mut self, key: Option<String>) {
        self.history.record(self.layout.snapshot());
        self.bump(key);
        self.publish_history();
    }

    fn after_history_move(&mut self) {
        self.gesture.cancel();
        self.gesture_key = None;
        self.bump(None);
        self.publish_history();
    }

    fn bump(&mut self, key: Option<String>) {
        self.revision += 1;
        self.events.publish(EditorEvent::LayoutChanged {
            revision: self.revision,
            key,
        });
    }

    fn publish_history(&mut self) {
        self.events.publish(EditorEvent::HistoryMoved {
            cursor: self.history.cursor(),
            len: self.history.len(),
        });
    }
}
