//! Paints a preview [`Scene`] with egui and turns pointer input into editor
//! gestures.

use eframe::egui::{self, Color32, Pos2, Stroke, Vec2, pos2, vec2};
use keyprint_core::layout::Rect;
use keyprint_core::raster::parse_color;
use keyprint_core::render::{ImageNode, PanelNode, Scene};
use keyprint_core::specs::PanelShape;
use keyprint_core::units::SCREEN_PX_PER_MM;
use keyprint_core::{EditorKey, EditorSession, PointerRelease};
use std::collections::HashMap;

const SHEET_COLOR: Color32 = Color32::WHITE;
const TRIM_COLOR: Color32 = Color32::from_rgb(0xe5, 0x39, 0x35);
const SAFE_COLOR: Color32 = Color32::from_rgb(0x1e, 0x88, 0xe5);
const FOLD_COLOR: Color32 = Color32::from_rgb(0x9e, 0x9e, 0x9e);
const ACTIVE_COLOR: Color32 = Color32::from_rgb(0xff, 0x98, 0x00);
const GUIDE_WIDTH_MM: f32 = 0.2;
const DASH_MM: f32 = 1.0;

/// Pointer id used for the mouse; touches are offset past it
const MOUSE_POINTER: u64 = 0;

/// Maps sheet millimeters to screen points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    pub origin: Pos2,
    pub px_per_mm: f32,
}

impl SceneView {
    pub fn new(origin: Pos2, scene: &Scene) -> Self {
        Self {
            origin,
            px_per_mm: SCREEN_PX_PER_MM * scene.display_scale,
        }
    }

    pub fn to_screen(&self, x_mm: f32, y_mm: f32) -> Pos2 {
        self.origin + vec2(x_mm, y_mm) * self.px_per_mm
    }

    pub fn rect(&self, r: &Rect) -> egui::Rect {
        egui::Rect::from_min_size(
            self.to_screen(r.x, r.y),
            vec2(r.width, r.height) * self.px_per_mm,
        )
    }

    pub fn to_mm(&self, pos: Pos2) -> (f32, f32) {
        let d = (pos - self.origin) / self.px_per_mm;
        (d.x, d.y)
    }

    fn stroke(&self, color: Color32) -> Stroke {
        Stroke::new((GUIDE_WIDTH_MM * self.px_per_mm).max(1.0), color)
    }
}

/// Textures keyed by image reference
pub type TextureCache = HashMap<String, egui::TextureHandle>;

// =============================================================================
// Painting
// =============================================================================

pub fn paint_scene(painter: &egui::Painter, view: &SceneView, scene: &Scene, textures: &TextureCache) {
    let sheet = view.rect(&Rect::new(0.0, 0.0, scene.width_mm, scene.height_mm));
    painter.rect_filled(sheet, 0.0, SHEET_COLOR);

    for panel in &scene.panels {
        paint_panel(painter, view, panel, textures);
    }

    for x in &scene.fold_lines_x_mm {
        let top = view.to_screen(*x, 0.0);
        let bottom = view.to_screen(*x, scene.height_mm);
        dashed(painter, view, top, bottom, FOLD_COLOR);
    }

    if let Some(guides) = &scene.group_guides {
        painter.rect_stroke(
            view.rect(&guides.trim),
            0.0,
            view.stroke(TRIM_COLOR),
            egui::StrokeKind::Middle,
        );
        dashed_rect(painter, view, view.rect(&guides.safe), SAFE_COLOR);
    }
}

fn paint_panel(painter: &egui::Painter, view: &SceneView, panel: &PanelNode, textures: &TextureCache) {
    let viewport = view.rect(&panel.viewport);
    let clipped = painter.with_clip_rect(viewport.intersect(painter.clip_rect()));
    let circle = panel.shape == PanelShape::Circle;
    let radius = viewport.width().min(viewport.height()) / 2.0;

    if let Some(color) = panel
        .background_color
        .as_deref()
        .and_then(parse_color)
        .map(|c| Color32::from_rgb(c.0[0], c.0[1], c.0[2]))
    {
        if circle {
            clipped.circle_filled(viewport.center(), radius, color);
        } else {
            clipped.rect_filled(viewport, 0.0, color);
        }
    }

    match panel.image.as_ref() {
        Some(image) => match textures.get(&image.src) {
            Some(texture) => paint_image(&clipped, view, image, texture),
            None => placeholder(&clipped, viewport, "Loading…"),
        },
        None => placeholder(&clipped, viewport, panel.kind.label()),
    }

    if circle {
        // Mask the corners the rectangular clip lets through
        let ring = radius * 0.5;
        clipped.circle_stroke(viewport.center(), radius + ring / 2.0, Stroke::new(ring, SHEET_COLOR));
    }
    if let Some(hole) = &panel.hole {
        let hole = view.rect(hole);
        painter.circle_filled(hole.center(), hole.width() / 2.0, SHEET_COLOR);
        painter.circle_stroke(hole.center(), hole.width() / 2.0, view.stroke(TRIM_COLOR));
    }

    let trim = view.rect(&panel.trim);
    let safe = view.rect(&panel.safe);
    if circle {
        painter.circle_stroke(trim.center(), trim.width() / 2.0, view.stroke(TRIM_COLOR));
        dashed_circle(painter, view, safe.center(), safe.width() / 2.0, SAFE_COLOR);
    } else {
        painter.rect_stroke(trim, 0.0, view.stroke(TRIM_COLOR), egui::StrokeKind::Middle);
        dashed_rect(painter, view, safe, SAFE_COLOR);
    }

    if panel.active {
        let stroke = Stroke::new(2.0, ACTIVE_COLOR);
        if circle {
            painter.circle_stroke(viewport.center(), radius + 1.0, stroke);
        } else {
            painter.rect_stroke(viewport, 0.0, stroke, egui::StrokeKind::Outside);
        }
    }
}

fn paint_image(painter: &egui::Painter, view: &SceneView, image: &ImageNode, texture: &egui::TextureHandle) {
    let p = &image.placement;
    let center = view.to_screen(p.center_x, p.center_y);
    let rect = egui::Rect::from_center_size(center, vec2(p.width, p.height) * view.px_per_mm);
    let uv = egui::Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

    let mut mesh = egui::Mesh::with_texture(texture.id());
    mesh.add_rect_with_uv(rect, uv, Color32::WHITE);
    if p.rotation_deg != 0.0 {
        mesh.rotate(egui::emath::Rot2::from_angle(p.rotation_deg.to_radians()), center);
    }
    painter.add(egui::Shape::mesh(mesh));
}

fn placeholder(painter: &egui::Painter, viewport: egui::Rect, text: &str) {
    painter.text(
        viewport.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(12.0),
        Color32::GRAY,
    );
}

fn dashed(painter: &egui::Painter, view: &SceneView, from: Pos2, to: Pos2, color: Color32) {
    let dash = DASH_MM * view.px_per_mm;
    painter.extend(egui::Shape::dashed_line(&[from, to], view.stroke(color), dash, dash));
}

fn dashed_rect(painter: &egui::Painter, view: &SceneView, rect: egui::Rect, color: Color32) {
    let points = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    let dash = DASH_MM * view.px_per_mm;
    painter.extend(egui::Shape::dashed_line(&points, view.stroke(color), dash, dash));
}

fn dashed_circle(painter: &egui::Painter, view: &SceneView, center: Pos2, radius: f32, color: Color32) {
    let segments = 96;
    let points: Vec<Pos2> = (0..=segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            center + Vec2::angled(angle) * radius
        })
        .collect();
    let dash = DASH_MM * view.px_per_mm;
    painter.extend(egui::Shape::dashed_line(&points, view.stroke(color), dash, dash));
}

// =============================================================================
// Input
// =============================================================================

/// Pointer bookkeeping between frames
#[derive(Debug, Default)]
pub struct CanvasInput {
    mouse_down: bool,
    touches: usize,
}

impl CanvasInput {
    /// Forward this frame's pointer activity over the canvas to the session.
    ///
    /// Returns whether the layout changed.
    pub fn handle(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        view: &SceneView,
        scene: &Scene,
        session: &mut EditorSession,
    ) -> bool {
        let mut changed = false;
        let events = ui.input(|i| i.events.clone());

        for event in &events {
            if let egui::Event::Touch { id, phase, pos, .. } = event {
                changed |= self.touch(*id, *phase, *pos, view, scene, session);
            }
        }

        // egui also reports the first touch as a mouse; skip that echo
        if self.touches == 0 {
            changed |= self.mouse(ui, response, view, scene, session);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll > 0.0 {
                session.handle_key(EditorKey::ZoomIn);
                changed = true;
            } else if scroll < 0.0 {
                session.handle_key(EditorKey::ZoomOut);
                changed = true;
            }
        }
        changed
    }

    fn mouse(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        view: &SceneView,
        scene: &Scene,
        session: &mut EditorSession,
    ) -> bool {
        if response.drag_started()
            && let Some(origin) = ui.input(|i| i.pointer.press_origin())
        {
            select_at(origin, view, scene, session);
            session.pointer_down(MOUSE_POINTER, origin.x, origin.y);
            self.mouse_down = true;
        }

        let mut changed = false;
        if self.mouse_down
            && response.dragged()
            && let Some(pos) = response.interact_pointer_pos()
        {
            changed |= session.pointer_move(MOUSE_POINTER, pos.x, pos.y).is_some();
        }

        if self.mouse_down && response.drag_stopped() {
            self.mouse_down = false;
            session.pointer_up(MOUSE_POINTER);
            changed = true;
        }

        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            changed |= select_at(pos, view, scene, session);
        }
        changed
    }

    fn touch(
        &mut self,
        id: egui::TouchId,
        phase: egui::TouchPhase,
        pos: Pos2,
        view: &SceneView,
        scene: &Scene,
        session: &mut EditorSession,
    ) -> bool {
        let pointer = id.0 + 1;
        match phase {
            egui::TouchPhase::Start => {
                if self.touches == 0 {
                    select_at(pos, view, scene, session);
                }
                self.touches += 1;
                session.pointer_down(pointer, pos.x, pos.y);
                false
            }
            egui::TouchPhase::Move => session.pointer_move(pointer, pos.x, pos.y).is_some(),
            egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                self.touches = self.touches.saturating_sub(1);
                session.pointer_up(pointer) != PointerRelease::Ignored
            }
        }
    }
}

/// Make the panel under `pos` active; returns whether the selection changed
fn select_at(pos: Pos2, view: &SceneView, scene: &Scene, session: &mut EditorSession) -> bool {
    let (x_mm, y_mm) = view.to_mm(pos);
    match scene.hit_test(x_mm, y_mm) {
        Some(key) if key != session.active() => session.set_active(key).is_ok(),
        _ => false,
    }
}

/// Editor shortcut for a key press, if any
pub fn editor_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<EditorKey> {
    if modifiers.command {
        return match key {
            egui::Key::Z if modifiers.shift => Some(EditorKey::Redo),
            egui::Key::Z => Some(EditorKey::Undo),
            egui::Key::Y => Some(EditorKey::Redo),
            _ => None,
        };
    }
    match key {
        egui::Key::ArrowUp => Some(EditorKey::ArrowUp),
        egui::Key::ArrowDown => Some(EditorKey::ArrowDown),
        egui::Key::ArrowLeft => Some(EditorKey::ArrowLeft),
        egui::Key::ArrowRight => Some(EditorKey::ArrowRight),
        egui::Key::Plus | egui::Key::Equals => Some(EditorKey::ZoomIn),
        egui::Key::Minus => Some(EditorKey::ZoomOut),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyprint_core::render::build_scene;
    use keyprint_core::{Layout, Template, arrange};

    fn four_by_five_scene(display_scale: f32) -> Scene {
        let layout = Layout::new(Template::FourByFive);
        let sheet = arrange(
            Template::FourByFive.preview_arrangements()[0],
            |k| layout.get(k).is_some(),
        );
        build_scene(&sheet, &layout, Some("front"), display_scale)
    }

    #[test]
    fn view_maps_both_ways() {
        let scene = four_by_five_scene(0.5);
        let view = SceneView::new(pos2(10.0, 20.0), &scene);
        let p = view.to_screen(40.0, 30.0);
        assert!((p.x - (10.0 + 40.0 * 3.78 * 0.5)).abs() < 1e-3);
        let (x, y) = view.to_mm(p);
        assert!((x - 40.0).abs() < 1e-3 && (y - 30.0).abs() < 1e-3);
    }

    #[test]
    fn click_selects_panel_under_pointer() {
        let scene = four_by_five_scene(1.0);
        let view = SceneView::new(Pos2::ZERO, &scene);
        let mut session = EditorSession::from_template(Template::FourByFive);
        let back = scene.panel("back").unwrap();
        let pos = view.rect(&back.viewport).center();

        assert!(select_at(pos, &view, &scene, &mut session));
        assert_eq!(session.active(), "back");
        // Same panel again is not a change
        assert!(!select_at(pos, &view, &scene, &mut session));
        // Undo history is untouched by selection
        assert!(!session.can_undo());
    }

    #[test]
    fn shortcuts() {
        let none = egui::Modifiers::NONE;
        let cmd = egui::Modifiers::COMMAND;
        assert_eq!(editor_key(egui::Key::Z, cmd), Some(EditorKey::Undo));
        assert_eq!(
            editor_key(egui::Key::Z, cmd | egui::Modifiers::SHIFT),
            Some(EditorKey::Redo)
        );
        assert_eq!(editor_key(egui::Key::Y, cmd), Some(EditorKey::Redo));
        assert_eq!(editor_key(egui::Key::Equals, none), Some(EditorKey::ZoomIn));
        assert_eq!(editor_key(egui::Key::Minus, none), Some(EditorKey::ZoomOut));
        assert_eq!(editor_key(egui::Key::ArrowLeft, none), Some(EditorKey::ArrowLeft));
        assert_eq!(editor_key(egui::Key::Z, none), None);
    }
}
