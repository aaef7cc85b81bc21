use keyprint_core::{ImageLoader, SheetPlan};
use keyprint_runtime::{ExportFormat, KioskOptions, KioskUpdate, export_sheet, render_preview};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn handle_preview(
    plan: SheetPlan,
    dpi: u32,
    loader: Arc<dyn ImageLoader>,
    options: &KioskOptions,
    update_tx: &mpsc::UnboundedSender<KioskUpdate>,
) {
    match render_preview(&plan, loader, options, dpi).await {
        Ok(outcome) => {
            let _ = update_tx.send(KioskUpdate::SheetPreviewRendered {
                width: outcome.image.width() as usize,
                height: outcome.image.height() as usize,
                failed_panels: outcome.failed_panels,
                rgba_data: outcome.image.into_raw(),
            });
        }
        Err(e) => {
            let _ = update_tx.send(KioskUpdate::Error {
                message: format!("Failed to render sheet preview: {e}"),
            });
        }
    }
}

pub async fn handle_export(
    plan: SheetPlan,
    format: ExportFormat,
    output_path: PathBuf,
    loader: Arc<dyn ImageLoader>,
    options: &KioskOptions,
    update_tx: &mpsc::UnboundedSender<KioskUpdate>,
) {
    let _ = update_tx.send(KioskUpdate::Progress {
        operation: format!("Exporting {}", output_path.display()),
        current: 0,
        total: 1,
    });

    match export_sheet(&plan, loader, options, format, &output_path).await {
        Ok(report) => {
            let _ = update_tx.send(KioskUpdate::ExportComplete { report });
        }
        Err(e) => {
            let _ = update_tx.send(KioskUpdate::Error {
                message: format!("Failed to export sheet: {e}"),
            });
        }
    }
}
