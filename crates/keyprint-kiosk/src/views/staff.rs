use eframe::egui;
use keyprint_core::staff::{MemoryStore, ScanCollector, ScanOutcome, StaffSession};
use keyprint_core::{EditorSession, SheetKind, SheetPlan, decode_scanned};
use keyprint_runtime::{ExportFormat, ExportReport, KioskCommand};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Low resolution keeps the on-screen preview quick to compose
pub const PREVIEW_DPI: u32 = 60;

pub struct StaffState {
    session: StaffSession<MemoryStore>,
    collector: ScanCollector,
    scan_input: String,
    plan: Option<SheetPlan>,
    preview: Option<egui::TextureHandle>,
    preview_failed: Vec<String>,
    pub last_export: Option<ExportReport>,
}

/// Something the staff screen asks the app to do
pub enum StaffAction {
    OpenInEditor(EditorSession),
}

impl StaffState {
    pub fn new() -> Self {
        let session = StaffSession::new(MemoryStore::new());
        let collector = ScanCollector::from_session(&session);
        Self {
            session,
            collector,
            scan_input: String::new(),
            plan: None,
            preview: None,
            preview_failed: Vec::new(),
            last_export: None,
        }
    }

    pub fn preview_rendered(
        &mut self,
        ctx: &egui::Context,
        image: egui::ColorImage,
        failed_panels: Vec<String>,
    ) {
        self.preview = Some(ctx.load_texture("sheet_preview", image, egui::TextureOptions::LINEAR));
        self.preview_failed = failed_panels;
    }

    fn add_scan(&mut self) {
        let text = self.scan_input.trim().to_string();
        if text.is_empty() {
            return;
        }
        match self.collector.add_entry(&text) {
            Ok(ScanOutcome::AddedFourUp { count }) => {
                log::info!("Added 4x5 code ({count} collected)")
            }
            Ok(ScanOutcome::AddedCd) => log::info!("Added CD code"),
            Ok(ScanOutcome::Duplicate) => log::warn!("That card is already collected"),
            Ok(ScanOutcome::Full) => log::warn!("The sheet already holds four cards"),
            Err(e) => log::warn!("Could not read code: {e}"),
        }
        self.scan_input.clear();
    }

    fn make_sheet(&mut self, command_tx: &mpsc::UnboundedSender<KioskCommand>) {
        let plan = self
            .collector
            .handoff(&mut self.session)
            .and_then(|kind| SheetPlan::from_session(&self.session, kind));
        match plan {
            Ok(plan) => {
                self.preview = None;
                self.preview_failed.clear();
                let _ = command_tx.send(KioskCommand::RenderSheetPreview {
                    plan: plan.clone(),
                    dpi: PREVIEW_DPI,
                });
                self.plan = Some(plan);
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    fn clear(&mut self) {
        self.collector.clear();
        self.session.clear_four_up();
        self.session.clear_cd();
        self.plan = None;
        self.preview = None;
        self.preview_failed.clear();
        self.last_export = None;
    }
}

impl Default for StaffState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn show_staff(
    ui: &mut egui::Ui,
    state: &mut StaffState,
    command_tx: &mpsc::UnboundedSender<KioskCommand>,
) -> Option<StaffAction> {
    let mut action = None;

    egui::SidePanel::left("staff_controls")
        .min_width(280.0)
        .show_inside(ui, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Print station");
                ui.separator();

                ui.label("Scan or paste a code or photo link");
                let response = ui.text_edit_singleline(&mut state.scan_input);
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("➕ Add").clicked() || submitted {
                        state.add_scan();
                        response.request_focus();
                    }
                    if ui.button("✏ Edit").on_hover_text("Open the code in the editor").clicked() {
                        match decode_scanned(state.scan_input.trim())
                            .and_then(|payload| payload.to_layout())
                        {
                            Ok(layout) => {
                                state.scan_input.clear();
                                action = Some(StaffAction::OpenInEditor(EditorSession::new(layout)));
                            }
                            Err(e) => log::warn!("Could not read code: {e}"),
                        }
                    }
                });

                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                collected_section(ui, state);

                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    let ready = state.collector.ready_sheet();
                    let label = match ready {
                        Some(SheetKind::Cd) => "Make CD sheet",
                        _ => "Make 4-up sheet",
                    };
                    if ui.add_enabled(ready.is_some(), egui::Button::new(label)).clicked() {
                        state.make_sheet(command_tx);
                    }
                    if ui.button("🗑 Clear").clicked() {
                        state.clear();
                    }
                });

                if let Some(plan) = &state.plan {
                    ui.add_space(10.0);
                    export_section(ui, plan, command_tx);
                }

                if let Some(report) = &state.last_export {
                    ui.add_space(10.0);
                    ui.label(format!(
                        "Saved {} ({} x {} px)",
                        report.path.display(),
                        report.width_px,
                        report.height_px
                    ));
                    if let Some(warning) = report.warning() {
                        ui.colored_label(egui::Color32::from_rgb(200, 120, 0), warning);
                    }
                }
            });
        });

    egui::CentralPanel::default().show_inside(ui, |ui| match &state.preview {
        Some(texture) => {
            if let Some(warning) = keyprint_core::failed_panels_warning(&state.preview_failed) {
                ui.colored_label(egui::Color32::from_rgb(200, 120, 0), warning);
            }
            let available = ui.available_size();
            let size = texture.size_vec2();
            let scale = (available.x / size.x).min(available.y / size.y).min(4.0);
            ui.centered_and_justified(|ui| {
                ui.image((texture.id(), size * scale));
            });
        }
        None if state.plan.is_some() => {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
        }
        None => {
            ui.centered_and_justified(|ui| {
                ui.label("Scan customer codes to build a sheet");
            });
        }
    });

    action
}

fn collected_section(ui: &mut egui::Ui, state: &StaffState) {
    let cards = state.collector.four_up();
    ui.label(format!("4x5 cards: {} of 4", cards.len()));
    for (i, card) in cards.iter().enumerate() {
        let image = card.front.img.as_deref().unwrap_or("(no image)");
        ui.label(format!("  Card {}: {}", i + 1, shorten(image)));
    }
    match state.collector.cd() {
        Some(cd) => {
            let image = cd.front.img.as_deref().unwrap_or("(no image)");
            ui.label(format!("CD: {}", shorten(image)));
        }
        None => {
            ui.label("CD: none");
        }
    }
}

fn export_section(
    ui: &mut egui::Ui,
    plan: &SheetPlan,
    command_tx: &mpsc::UnboundedSender<KioskCommand>,
) {
    ui.label("Export");
    ui.horizontal(|ui| {
        for (label, format) in [
            ("PNG", ExportFormat::Png),
            ("JPEG", ExportFormat::Jpeg),
            ("PDF", ExportFormat::Pdf),
        ] {
            if ui.button(label).clicked()
                && let Some(output_path) = pick_output(plan, format)
            {
                let _ = command_tx.send(KioskCommand::ExportSheet {
                    plan: plan.clone(),
                    format,
                    output_path,
                });
            }
        }
    });
}

fn pick_output(plan: &SheetPlan, format: ExportFormat) -> Option<PathBuf> {
    let kind = match plan.arrangement() {
        keyprint_core::Arrangement::CdSheet => SheetKind::Cd,
        _ => SheetKind::FourUp,
    };
    let extension = format.extension();
    rfd::FileDialog::new()
        .add_filter(extension.to_uppercase(), &[extension])
        .set_file_name(format!("{}.{extension}", kind.file_stem()))
        .save_file()
}

/// Data URIs are far too long to show in a list
fn shorten(reference: &str) -> String {
    if reference.starts_with("data:") {
        return "embedded image".to_string();
    }
    if reference.chars().count() > 48 {
        let head: String = reference.chars().take(45).collect();
        format!("{head}...")
    } else {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_references_are_shortened() {
        assert_eq!(shorten("data:image/png;base64,AAAA"), "embedded image");
        assert_eq!(shorten("https://img.example/a.png"), "https://img.example/a.png");
        let long = format!("https://img.example/{}", "x".repeat(80));
        assert!(shorten(&long).ends_with("..."));
        assert_eq!(shorten(&long).chars().count(), 48);
    }
}
