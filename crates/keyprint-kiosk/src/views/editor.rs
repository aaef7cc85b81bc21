use eframe::egui;
use keyprint_core::input::{classify_paste, image_file_data_uri};
use keyprint_core::render::{build_scene, fit_display_scale};
use keyprint_core::units::SCREEN_PX_PER_MM;
use keyprint_core::{
    Arrangement, EditorKey, EditorSession, PanelGroup, SheetLayout, Template, ZoomDirection,
    arrange,
};
use keyprint_runtime::KioskCommand;
use std::collections::HashSet;
use tokio::sync::mpsc;

use crate::canvas::{CanvasInput, SceneView, TextureCache, editor_key, paint_scene};

pub struct EditorState {
    pub session: EditorSession,
    pub textures: TextureCache,
    /// References already sent to the worker
    requested: HashSet<String>,
    canvas: CanvasInput,
    image_input: String,
    color_input: String,
    share_url: Option<String>,
    share_qr: Option<egui::TextureHandle>,
    /// Show the case back as folded (no gaps) instead of the preview strip
    back_fold: bool,
}

impl EditorState {
    pub fn new(template: Template) -> Self {
        Self {
            session: EditorSession::from_template(template),
            textures: TextureCache::new(),
            requested: HashSet::new(),
            canvas: CanvasInput::default(),
            image_input: String::new(),
            color_input: String::new(),
            share_url: None,
            share_qr: None,
            back_fold: false,
        }
    }

    /// Continue editing a decoded layout
    pub fn with_session(session: EditorSession) -> Self {
        Self {
            session,
            ..Self::new(Template::FourByFive)
        }
    }

    /// Texture arrived; fill in natural sizes for every panel showing it
    pub fn image_loaded(
        &mut self,
        ctx: &egui::Context,
        reference: String,
        natural: (u32, u32),
        image: egui::ColorImage,
    ) {
        let keys: Vec<String> = self
            .session
            .layout()
            .iter()
            .filter(|(_, r)| r.image_ref.as_deref() == Some(reference.as_str()))
            .filter(|(_, r)| r.natural_size().is_none())
            .map(|(k, _)| k.to_string())
            .collect();
        for key in keys {
            self.session.record_natural_size(&key, natural.0, natural.1);
        }

        let texture = ctx.load_texture(&reference, image, egui::TextureOptions::LINEAR);
        self.textures.insert(reference, texture);
    }

    /// Link and rendered code from the worker
    pub fn share_ready(&mut self, ctx: &egui::Context, url: String, qr: egui::ColorImage) {
        // Nearest keeps module edges sharp when the code is scaled up
        self.share_qr = Some(ctx.load_texture("share_qr", qr, egui::TextureOptions::NEAREST));
        self.share_url = Some(url);
    }

    /// Any edit invalidates a shown code
    fn clear_share(&mut self) {
        self.share_url = None;
        self.share_qr = None;
    }

    /// Allow another attempt the next time the panel is shown
    pub fn image_failed(&mut self, reference: &str) {
        self.requested.remove(reference);
    }

    fn sheet_layout(&self) -> SheetLayout {
        let arrangement = match self.session.arrangement() {
            Arrangement::BackStrip if self.back_fold => Arrangement::BackFoldStrip,
            other => other,
        };
        let layout = self.session.layout();
        arrange(arrangement, |key| layout.get(key).is_some())
    }

    fn use_image(&mut self, text: &str) {
        match classify_paste(text).and_then(|reference| self.session.set_image(&reference)) {
            Ok(()) => {
                self.clear_share();
                self.image_input.clear();
                log::info!("Image set on {}", self.session.active());
            }
            Err(e) => log::warn!("{e}"),
        }
    }
}

pub fn show_editor(
    ui: &mut egui::Ui,
    state: &mut EditorState,
    command_tx: &mpsc::UnboundedSender<KioskCommand>,
) {
    egui::SidePanel::left("editor_controls")
        .min_width(260.0)
        .show_inside(ui, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Design");
                ui.separator();

                template_section(ui, state);
                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                panel_section(ui, state);
                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                transform_section(ui, state);
                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                image_section(ui, state);
                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                share_section(ui, state, command_tx);
            });
        });

    egui::CentralPanel::default().show_inside(ui, |ui| {
        handle_keyboard(ui, state);
        show_canvas(ui, state, command_tx);
    });
}

fn template_section(ui: &mut egui::Ui, state: &mut EditorState) {
    let current = state.session.template();
    let mut selected = current;
    egui::ComboBox::from_label("Template")
        .selected_text(template_name(current))
        .show_ui(ui, |ui| {
            for template in Template::ALL {
                ui.selectable_value(&mut selected, template, template_name(template));
            }
        });
    if selected != current {
        *state = EditorState::new(selected);
        log::info!("Started a new {} design", template_name(selected));
    }
}

fn template_name(template: Template) -> &'static str {
    match template {
        Template::FourByFive => "4x5 card",
        Template::Cd3Simple => "CD (simple)",
        Template::Cd3Panel => "CD (panels)",
    }
}

fn panel_section(ui: &mut egui::Ui, state: &mut EditorState) {
    if state.session.template() == Template::Cd3Panel {
        ui.label("Group");
        ui.horizontal(|ui| {
            for group in PanelGroup::ALL {
                let selected = state.session.group() == Some(group);
                if ui.selectable_label(selected, group.label()).clicked()
                    && !selected
                    && let Err(e) = state.session.select_group(group)
                {
                    log::warn!("Cannot switch to {}: {e}", group.label());
                }
            }
        });
        if state.session.group() == Some(PanelGroup::Back) {
            ui.checkbox(&mut state.back_fold, "Show folded");
        }
        ui.add_space(5.0);
    }

    ui.label("Panel");
    let keys: Vec<(String, &'static str)> = state
        .session
        .layout()
        .iter()
        .filter(|(key, _)| match state.session.group() {
            Some(group) => group.keys().contains(key),
            None => true,
        })
        .map(|(key, record)| (key.to_string(), record.kind.label()))
        .collect();
    ui.horizontal_wrapped(|ui| {
        for (key, label) in keys {
            let selected = state.session.active() == key;
            if ui.selectable_label(selected, label).clicked()
                && !selected
                && let Err(e) = state.session.set_active(&key)
            {
                log::warn!("Cannot select {label}: {e}");
            }
        }
    });
}

fn transform_section(ui: &mut egui::Ui, state: &mut EditorState) {
    let session = &mut state.session;
    ui.horizontal(|ui| {
        if ui.add_enabled(session.can_undo(), egui::Button::new("↶ Undo")).clicked() {
            session.undo();
        }
        if ui.add_enabled(session.can_redo(), egui::Button::new("↷ Redo")).clicked() {
            session.redo();
        }
    });

    ui.horizontal(|ui| {
        if ui.button("➖").on_hover_text("Zoom out").clicked() {
            session.zoom(ZoomDirection::Out);
        }
        if ui.button("➕").on_hover_text("Zoom in").clicked() {
            session.zoom(ZoomDirection::In);
        }
        if let Some(record) = session.active_record() {
            ui.label(format!("{:.0}%", record.transform.scale * 100.0));
        }
    });

    ui.horizontal(|ui| {
        for (label, key) in [
            ("⬅", EditorKey::ArrowLeft),
            ("⬆", EditorKey::ArrowUp),
            ("⬇", EditorKey::ArrowDown),
            ("➡", EditorKey::ArrowRight),
        ] {
            if ui.button(label).clicked() {
                session.handle_key(key);
            }
        }
    });

    ui.horizontal_wrapped(|ui| {
        let can_cover = session
            .active_record()
            .is_some_and(|r| r.natural_size().is_some());
        if ui
            .add_enabled(can_cover, egui::Button::new("Fill"))
            .on_hover_text("Cover the panel with no empty edges")
            .clicked()
        {
            session.cover();
        }
        if ui.button("Reset").clicked() {
            session.reset();
        }
        if ui.button("Fit width").clicked() {
            session.fit_width();
        }
        if ui.button("Fit height").clicked() {
            session.fit_height();
        }
        if ui.button("Center").clicked() {
            session.center();
        }
    });
}

fn image_section(ui: &mut egui::Ui, state: &mut EditorState) {
    ui.label("Image link");
    let response = ui.text_edit_singleline(&mut state.image_input);
    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
    ui.horizontal(|ui| {
        if ui.button("Use link").clicked() || submitted {
            let text = state.image_input.clone();
            state.use_image(&text);
        }
        if ui.button("📂 Open image...").clicked() {
            open_image_file(state);
        }
    });

    ui.add_space(5.0);
    ui.label("Background color");
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(&mut state.color_input).desired_width(90.0));
        if ui.button("Apply").clicked() {
            let color = state.color_input.trim();
            if color.is_empty() {
                state.session.set_background_color(None);
            } else if keyprint_core::raster::parse_color(color).is_some() {
                state.session.set_background_color(Some(color.to_string()));
            } else {
                log::warn!("Unknown color '{color}'");
            }
        }
        if ui.button("Clear").clicked() {
            state.color_input.clear();
            state.session.set_background_color(None);
        }
    });
}

fn open_image_file(state: &mut EditorState) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg"])
        .pick_file()
    else {
        return;
    };
    match std::fs::read(&path) {
        Ok(bytes) => match image_file_data_uri(&bytes) {
            Ok(uri) => state.use_image(&uri),
            Err(e) => log::warn!("{}: {e}", path.display()),
        },
        Err(e) => log::warn!("Failed to read {}: {e}", path.display()),
    }
}

fn share_section(
    ui: &mut egui::Ui,
    state: &mut EditorState,
    command_tx: &mpsc::UnboundedSender<KioskCommand>,
) {
    if ui.button("🔗 Create share link").clicked() {
        let _ = command_tx.send(KioskCommand::GenerateShareCode {
            layout: state.session.layout().clone(),
        });
    }
    if let Some(url) = &state.share_url {
        ui.horizontal(|ui| {
            if ui.button("📋 Copy").clicked() {
                ui.ctx().copy_text(url.clone());
            }
            ui.label(format!("{} characters", url.len()));
        });
        if let Some(qr) = &state.share_qr {
            let side = ui.available_width().min(240.0);
            ui.add(egui::Image::new(qr).fit_to_exact_size(egui::vec2(side, side)));
        }
        let mut shown = url.as_str();
        ui.add(egui::TextEdit::multiline(&mut shown).desired_rows(3));
    }
}

fn handle_keyboard(ui: &egui::Ui, state: &mut EditorState) {
    if ui.ctx().wants_keyboard_input() {
        return;
    }
    let events = ui.input(|i| i.events.clone());
    for event in events {
        match event {
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                if let Some(editor_key) = editor_key(key, modifiers) {
                    state.session.handle_key(editor_key);
                }
            }
            egui::Event::Paste(text) => state.use_image(&text),
            _ => {}
        }
    }
}

fn show_canvas(
    ui: &mut egui::Ui,
    state: &mut EditorState,
    command_tx: &mpsc::UnboundedSender<KioskCommand>,
) {
    let sheet = state.sheet_layout();
    let available = ui.available_size();
    let display_scale = fit_display_scale(
        available.x,
        available.y,
        sheet.width_mm,
        sheet.height_mm,
        SCREEN_PX_PER_MM,
    );
    let scene = build_scene(
        &sheet,
        state.session.layout(),
        Some(state.session.active()),
        display_scale,
    );

    for panel in &scene.panels {
        if let Some(image) = &panel.image
            && !state.textures.contains_key(&image.src)
            && state.requested.insert(image.src.clone())
        {
            let _ = command_tx.send(KioskCommand::LoadImage {
                key: panel.key.clone(),
                reference: image.src.clone(),
            });
        }
    }

    let size = egui::vec2(sheet.width_mm, sheet.height_mm) * SCREEN_PX_PER_MM * display_scale;
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let view = SceneView::new(response.rect.min, &scene);
    paint_scene(&painter, &view, &scene, &state.textures);

    if state
        .canvas
        .handle(ui, &response, &view, &scene, &mut state.session)
    {
        state.clear_share();
        ui.ctx().request_repaint();
    }
}
