use keyprint_core::{ImageLoader, load_with_timeout};
use keyprint_runtime::KioskUpdate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Longest texture edge uploaded for the on-screen preview
pub const MAX_TEXTURE_EDGE: u32 = 2048;

pub async fn handle_load_image(
    key: String,
    reference: String,
    loader: Arc<dyn ImageLoader>,
    timeout: Duration,
    update_tx: mpsc::UnboundedSender<KioskUpdate>,
) {
    match load_with_timeout(loader, &reference, timeout).await {
        Ok(image) => {
            let (natural_width, natural_height) = (image.width(), image.height());
            // Natural size is reported as-is; only the texture is reduced
            let display = if natural_width > MAX_TEXTURE_EDGE || natural_height > MAX_TEXTURE_EDGE {
                image.thumbnail(MAX_TEXTURE_EDGE, MAX_TEXTURE_EDGE)
            } else {
                image
            };
            let rgba = display.to_rgba8();
            let _ = update_tx.send(KioskUpdate::ImageLoaded {
                key,
                reference,
                natural_width,
                natural_height,
                width: rgba.width() as usize,
                height: rgba.height() as usize,
                rgba_data: rgba.into_raw(),
            });
        }
        Err(e) => {
            log::warn!("Could not load image for '{key}': {e}");
            let _ = update_tx.send(KioskUpdate::ImageFailed {
                key,
                reference,
                message: e.to_string(),
            });
        }
    }
}
