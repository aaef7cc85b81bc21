use keyprint_core::Layout;
use keyprint_core::share::generate_share_code;
use keyprint_runtime::{KioskOptions, KioskUpdate};
use tokio::sync::mpsc;

pub async fn handle_generate(
    layout: Layout,
    options: &KioskOptions,
    update_tx: &mpsc::UnboundedSender<KioskUpdate>,
) {
    let origin = options.app_origin.clone();
    let encoder = options.qr_encoder();
    // Recompression decodes and re-encodes images
    let result =
        tokio::task::spawn_blocking(move || generate_share_code(&layout, &origin, &encoder)).await;

    match result {
        Ok(Ok(code)) => {
            let (qr_width, qr_height) = code.code.dimensions();
            let _ = update_tx.send(KioskUpdate::ShareCodeReady {
                url: code.url,
                layout: code.layout,
                attempts: code.attempts,
                qr_width: qr_width as usize,
                qr_height: qr_height as usize,
                qr_pixels: code.code.into_raw(),
            });
        }
        Ok(Err(e)) => {
            let _ = update_tx.send(KioskUpdate::Error {
                message: format!("Failed to create share link: {e}"),
            });
        }
        Err(e) => {
            let _ = update_tx.send(KioskUpdate::Error {
                message: format!("Share link task failed: {e}"),
            });
        }
    }
}
