use eframe::egui;
use keyprint_core::Template;
use keyprint_runtime::{KioskCommand, KioskUpdate};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::logger::AppLogger;
use crate::views::staff::StaffAction;
use crate::views::{EditorState, StaffState, show_editor, show_staff};
use crate::worker::{WorkerContext, worker_task};

#[derive(Default, PartialEq)]
enum Mode {
    #[default]
    Editor,
    Staff,
}

#[derive(Clone)]
struct ProgressState {
    operation: String,
    current: usize,
    total: usize,
}

pub struct KioskApp {
    mode: Mode,
    status: String,
    show_log: bool,
    logger: AppLogger,

    // Async infrastructure
    command_tx: mpsc::UnboundedSender<KioskCommand>,
    update_rx: mpsc::UnboundedReceiver<KioskUpdate>,

    // Progress tracking
    progress: Option<ProgressState>,

    editor: EditorState,
    staff: StaffState,

    _tokio_handle: tokio::runtime::Handle,
}

impl KioskApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        tokio_handle: tokio::runtime::Handle,
        logger: AppLogger,
        config_path: Option<PathBuf>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        // Spawn worker task
        tokio_handle.spawn(worker_task(
            command_rx,
            update_tx,
            WorkerContext::new(Default::default()),
        ));

        if let Some(path) = config_path {
            let _ = command_tx.send(KioskCommand::LoadConfig { path });
        }

        Self {
            mode: Mode::default(),
            status: String::new(),
            show_log: false,
            logger,
            command_tx,
            update_rx,
            progress: None,
            editor: EditorState::new(Template::FourByFive),
            staff: StaffState::new(),
            _tokio_handle: tokio_handle,
        }
    }

    fn apply_update(&mut self, ctx: &egui::Context, update: KioskUpdate) {
        match update {
            KioskUpdate::Progress {
                operation,
                current,
                total,
            } => {
                self.progress = Some(ProgressState {
                    operation,
                    current,
                    total,
                });
            }
            KioskUpdate::ImageLoaded {
                reference,
                natural_width,
                natural_height,
                width,
                height,
                rgba_data,
                ..
            } => {
                let image = egui::ColorImage::from_rgba_unmultiplied([width, height], &rgba_data);
                self.editor.image_loaded(
                    ctx,
                    reference,
                    (natural_width, natural_height),
                    image,
                );
            }
            KioskUpdate::ImageFailed {
                key,
                reference,
                message,
            } => {
                self.editor.image_failed(&reference);
                self.status = format!("Image for {key} could not be loaded: {message}");
            }
            KioskUpdate::ShareCodeReady {
                url,
                attempts,
                qr_width,
                qr_height,
                qr_pixels,
                ..
            } => {
                self.status = if attempts > 1 {
                    format!("Share link ready (images reduced to fit, {attempts} tries)")
                } else {
                    "Share link ready".to_string()
                };
                let image = egui::ColorImage::from_gray([qr_width, qr_height], &qr_pixels);
                self.editor.share_ready(ctx, url, image);
            }
            KioskUpdate::SheetPreviewRendered {
                width,
                height,
                rgba_data,
                failed_panels,
            } => {
                let image = egui::ColorImage::from_rgba_unmultiplied([width, height], &rgba_data);
                self.staff.preview_rendered(ctx, image, failed_panels);
                self.progress = None;
            }
            KioskUpdate::ExportComplete { report } => {
                self.status = format!("Exported sheet → {}", report.path.display());
                self.staff.last_export = Some(report);
                self.progress = None;
            }
            KioskUpdate::ConfigLoaded { options } => {
                self.status = format!("Configuration loaded ({} dpi)", options.dpi);
            }
            KioskUpdate::Error { message } => {
                self.status = format!("Error: {message}");
                self.progress = None;
            }
        }
    }
}

impl eframe::App for KioskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process all pending updates from worker
        let mut received = false;
        while let Ok(update) = self.update_rx.try_recv() {
            self.apply_update(ctx, update);
            received = true;
        }
        if received {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.mode, Mode::Editor, "🖼 Design");
                ui.selectable_value(&mut self.mode, Mode::Staff, "🖨 Print station");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.show_log, "📜 Log");
                });
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if let Some(ref progress) = self.progress {
                ui.label(&progress.operation);
                ui.add(
                    egui::ProgressBar::new(progress.current as f32 / progress.total.max(1) as f32)
                        .show_percentage(),
                );
                ctx.request_repaint(); // Keep updating during operations
            }
            let status = if self.status.is_empty() {
                self.logger.latest_message().unwrap_or_default()
            } else {
                self.status.clone()
            };
            ui.label(status);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.mode {
            Mode::Editor => show_editor(ui, &mut self.editor, &self.command_tx),
            Mode::Staff => {
                if let Some(StaffAction::OpenInEditor(session)) =
                    show_staff(ui, &mut self.staff, &self.command_tx)
                {
                    self.editor = EditorState::with_session(session);
                    self.mode = Mode::Editor;
                }
            }
        });

        if self.show_log {
            show_log_window(ctx, &self.logger, &mut self.show_log);
        }
    }
}

fn show_log_window(ctx: &egui::Context, logger: &AppLogger, open: &mut bool) {
    egui::Window::new("Log")
        .open(open)
        .default_width(520.0)
        .show(ctx, |ui| {
            if ui.button("Clear").clicked() {
                logger.clear();
            }
            ui.separator();
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for entry in logger.get_entries() {
                        let color = match entry.level {
                            log::Level::Error => egui::Color32::from_rgb(220, 60, 60),
                            log::Level::Warn => egui::Color32::from_rgb(200, 120, 0),
                            _ => ui.visuals().text_color(),
                        };
                        ui.colored_label(
                            color,
                            format!(
                                "{} [{}] {}",
                                entry.timestamp.format("%H:%M:%S"),
                                entry.level,
                                entry.message
                            ),
                        );
                    }
                });
        });
}
