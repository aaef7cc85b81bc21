//! Pointer gesture recognition
//!
//! One pointer pans, two pointers pinch. Deltas are always measured from the
//! baseline captured when the current gesture phase started, never
//! accumulated per move event.

use crate::transform::{ImageTransform, clamp_scale};
use crate::units::SCREEN_PX_PER_MM;
use std::collections::BTreeMap;

/// Partial transform produced by one pointer move
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureUpdate {
    pub translate_x_mm: Option<f32>,
    pub translate_y_mm: Option<f32>,
    pub scale: Option<f32>,
    /// Angle between the two pinch pointers relative to gesture start.
    /// Reported but not applied to the stored rotation.
    pub rotation_delta_deg: Option<f32>,
}

impl GestureUpdate {
    pub fn apply(&self, transform: ImageTransform) -> ImageTransform {
        ImageTransform {
            translate_x_mm: self.translate_x_mm.unwrap_or(transform.translate_x_mm),
            translate_y_mm: self.translate_y_mm.unwrap_or(transform.translate_y_mm),
            scale: self.scale.map(clamp_scale).unwrap_or(transform.scale),
            rotation_deg: transform.rotation_deg,
        }
    }
}

/// What happened when a pointer was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerRelease {
    /// Other pointers are still down
    Continuing,
    /// Last pointer lifted; the gesture is complete
    Finished,
    /// The pointer was not part of a gesture
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    transform: ImageTransform,
    anchor: (f32, f32),
    start_dist: f32,
    start_angle: f32,
}

/// Tracks active pointers over one panel
#[derive(Debug, Clone)]
pub struct GestureEngine {
    pointers: BTreeMap<u64, (f32, f32)>,
    baseline: Baseline,
    current: ImageTransform,
    px_per_mm: f32,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::with_px_per_mm(SCREEN_PX_PER_MM)
    }

    /// Engine whose drag deltas are divided by a custom screen density
    pub fn with_px_per_mm(px_per_mm: f32) -> Self {
        Self {
            pointers: BTreeMap::new(),
            baseline: Baseline {
                transform: ImageTransform::IDENTITY,
                anchor: (0.0, 0.0),
                start_dist: 0.0,
                start_angle: 0.0,
            },
            current: ImageTransform::IDENTITY,
            px_per_mm,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.pointers.is_empty()
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Register a pointer; `current` is the panel's transform right now
    pub fn pointer_down(&mut self, id: u64, x: f32, y: f32, current: &ImageTransform) {
        if self.pointers.is_empty() {
            self.current = *current;
        }
        self.pointers.insert(id, (x, y));
        self.rebase();
    }

    /// Move a pointer and compute the resulting update
    pub fn pointer_move(&mut self, id: u64, x: f32, y: f32) -> Option<GestureUpdate> {
        let slot = self.pointers.get_mut(&id)?;
        *slot = (x, y);

        let update = match self.pair() {
            None => {
                let dx = x - self.baseline.anchor.0;
                let dy = y - self.baseline.anchor.1;
                GestureUpdate {
                    translate_x_mm: Some(self.baseline.transform.translate_x_mm + dx / self.px_per_mm),
                    translate_y_mm: Some(self.baseline.transform.translate_y_mm + dy / self.px_per_mm),
                    ..Default::default()
                }
            }
            Some((p1, p2)) => {
                let dist = distance(p1, p2);
                let scale = if self.baseline.start_dist > 0.0 {
                    self.baseline.transform.scale * (dist / self.baseline.start_dist)
                } else {
                    self.baseline.transform.scale
                };
                GestureUpdate {
                    scale: Some(clamp_scale(scale)),
                    rotation_delta_deg: Some(
                        (angle(p1, p2) - self.baseline.start_angle).to_degrees(),
                    ),
                    ..Default::default()
                }
            }
        };

        self.current = update.apply(self.current);
        Some(update)
    }

    /// Release a pointer (up or cancel)
    pub fn pointer_up(&mut self, id: u64) -> PointerRelease {
        if self.pointers.remove(&id).is_none() {
            return PointerRelease::Ignored;
        }
        if self.pointers.is_empty() {
            PointerRelease::Finished
        } else {
            // Remaining pointers continue from where the gesture is now
            self.rebase();
            PointerRelease::Continuing
        }
    }

    /// Drop all pointers without finishing
    pub fn cancel(&mut self) {
        self.pointers.clear();
    }

    fn rebase(&mut self) {
        self.baseline.transform = self.current;
        if let Some(&first) = self.pointers.values().next() {
            self.baseline.anchor = first;
        }
        match self.pair() {
            Some((p1, p2)) => {
                self.baseline.start_dist = distance(p1, p2);
                self.baseline.start_angle = angle(p1, p2);
            }
            None => {
                self.baseline.start_dist = 0.0;
                self.baseline.start_angle = 0.0;
            }
        }
    }

    fn pair(&self) -> Option<((f32, f32), (f32, f32))> {
        let mut points = self.pointers.values();
        match (points.next(), points.next()) {
            (Some(&p1), Some(&p2)) => Some((p1, p2)),
            _ => None,
        }
    }
}

fn distance(p1: (f32, f32), p2: (f32, f32)) -> f32 {
    (p2.0 - p1.0).hypot(p2.1 - p1.1)
}

fn angle(p1: (f32, f32), p2: (f32, f32)) -> f32 {
    (p2.1 - p1.1).atan2(p2.0 - p1.0)
}
