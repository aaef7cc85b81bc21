use keyprint_runtime::{KioskOptions, KioskUpdate};
use std::path::PathBuf;
use tokio::sync::mpsc;

pub async fn handle_load_config(
    path: PathBuf,
    update_tx: &mpsc::UnboundedSender<KioskUpdate>,
) -> Option<KioskOptions> {
    match KioskOptions::load(&path).await {
        Ok(options) => {
            log::info!("Loaded configuration from {}", path.display());
            let _ = update_tx.send(KioskUpdate::ConfigLoaded {
                options: options.clone(),
            });
            Some(options)
        }
        Err(e) => {
            let _ = update_tx.send(KioskUpdate::Error {
                message: format!("Failed to load configuration: {e}"),
            });
            None
        }
    }
}
