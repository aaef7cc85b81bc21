use keyprint_core::{HttpImageLoader, ImageLoader};
use keyprint_runtime::{KioskCommand, KioskOptions, KioskUpdate};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::handlers;

/// What the worker needs to talk to the outside world
pub struct WorkerContext {
    pub options: KioskOptions,
    pub loader: Arc<dyn ImageLoader>,
}

impl WorkerContext {
    pub fn new(options: KioskOptions) -> Self {
        let loader = HttpImageLoader::from_options(&options).unwrap_or_else(|e| {
            log::warn!("Image proxy disabled: {e}");
            HttpImageLoader::new(options.image_timeout())
        });
        Self {
            options,
            loader: Arc::new(loader),
        }
    }
}

/// Async worker task that processes kiosk commands and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<KioskCommand>,
    update_tx: mpsc::UnboundedSender<KioskUpdate>,
    mut context: WorkerContext,
) {
    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut context, &mut command_rx, &update_tx).await;
    }
    log::debug!("Worker stopped");
}

async fn process_command(
    cmd: KioskCommand,
    context: &mut WorkerContext,
    command_rx: &mut mpsc::UnboundedReceiver<KioskCommand>,
    update_tx: &mpsc::UnboundedSender<KioskUpdate>,
) {
    match cmd {
        KioskCommand::LoadImage { key, reference } => {
            // Loads run alongside other commands; each reports on its own
            tokio::spawn(handlers::images::handle_load_image(
                key,
                reference,
                context.loader.clone(),
                context.options.image_timeout(),
                update_tx.clone(),
            ));
        }
        KioskCommand::GenerateShareCode { layout } => {
            handlers::share::handle_generate(layout, &context.options, update_tx).await;
        }
        KioskCommand::RenderSheetPreview { mut plan, mut dpi } => {
            // Drain any queued preview commands, keeping only the most recent
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let KioskCommand::RenderSheetPreview {
                    plan: new_plan,
                    dpi: new_dpi,
                } = next_cmd
                {
                    log::debug!("Discarding queued sheet preview, using newer request");
                    plan = new_plan;
                    dpi = new_dpi;
                } else {
                    Box::pin(process_command(next_cmd, context, command_rx, update_tx)).await;
                }
            }

            handlers::export::handle_preview(
                plan,
                dpi,
                context.loader.clone(),
                &context.options,
                update_tx,
            )
            .await;
        }
        KioskCommand::ExportSheet {
            plan,
            format,
            output_path,
        } => {
            handlers::export::handle_export(
                plan,
                format,
                output_path,
                context.loader.clone(),
                &context.options,
                update_tx,
            )
            .await;
        }
        KioskCommand::LoadConfig { path } => {
            if let Some(options) = handlers::config::handle_load_config(path, update_tx).await {
                *context = WorkerContext::new(options);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use keyprint_core::{KeyprintError, Layout};
    use std::time::Duration;

    /// 3000x1500 for `big.png`, failure for anything else
    struct FakeLoader;

    impl ImageLoader for FakeLoader {
        fn load(&self, reference: &str) -> keyprint_core::Result<DynamicImage> {
            if reference.ends_with("big.png") {
                Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                    3000,
                    1500,
                    Rgba([10, 20, 30, 255]),
                )))
            } else {
                Err(KeyprintError::ImageLoad {
                    reference: reference.to_string(),
                    reason: "offline".to_string(),
                })
            }
        }
    }

    fn spawn_worker() -> (
        mpsc::UnboundedSender<KioskCommand>,
        mpsc::UnboundedReceiver<KioskUpdate>,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let context = WorkerContext {
            options: KioskOptions {
                app_origin: "https://kiosk.example".to_string(),
                ..Default::default()
            },
            loader: Arc::new(FakeLoader),
        };
        tokio::spawn(worker_task(command_rx, update_tx, context));
        (command_tx, update_rx)
    }

    async fn next(update_rx: &mut mpsc::UnboundedReceiver<KioskUpdate>) -> KioskUpdate {
        tokio::time::timeout(Duration::from_secs(10), update_rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn loaded_image_keeps_natural_size() {
        let (command_tx, mut update_rx) = spawn_worker();
        command_tx
            .send(KioskCommand::LoadImage {
                key: "front".to_string(),
                reference: "https://img.example/big.png".to_string(),
            })
            .unwrap();

        match next(&mut update_rx).await {
            KioskUpdate::ImageLoaded {
                key,
                natural_width,
                natural_height,
                width,
                height,
                rgba_data,
                ..
            } => {
                assert_eq!(key, "front");
                assert_eq!((natural_width, natural_height), (3000, 1500));
                assert_eq!((width, height), (2048, 1024));
                assert_eq!(rgba_data.len(), width * height * 4);
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_image_is_reported() {
        let (command_tx, mut update_rx) = spawn_worker();
        command_tx
            .send(KioskCommand::LoadImage {
                key: "disc".to_string(),
                reference: "https://img.example/gone.png".to_string(),
            })
            .unwrap();
        assert!(matches!(
            next(&mut update_rx).await,
            KioskUpdate::ImageFailed { key, .. } if key == "disc"
        ));
    }

    #[tokio::test]
    async fn share_link_uses_configured_origin() {
        let (command_tx, mut update_rx) = spawn_worker();
        let layout = Layout::four_by_five_from_url("https://img.example/a.png");
        command_tx
            .send(KioskCommand::GenerateShareCode {
                layout: layout.clone(),
            })
            .unwrap();
        match next(&mut update_rx).await {
            KioskUpdate::ShareCodeReady {
                url,
                layout: encoded,
                attempts,
                qr_width,
                qr_height,
                qr_pixels,
            } => {
                assert!(url.starts_with("https://kiosk.example/p/4x5/edit?data="));
                assert_eq!(encoded, layout);
                assert_eq!(attempts, 1);
                assert_eq!(qr_width, qr_height);
                assert_eq!(qr_pixels.len(), qr_width * qr_height);
                // quiet zone is light, the symbol has dark modules
                assert_eq!(qr_pixels[0], 255);
                assert!(qr_pixels.contains(&0));
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_config_keeps_worker_alive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiosk.json");
        tokio::fs::write(&path, "{ \"dpi\": 1 }").await.unwrap();

        let (command_tx, mut update_rx) = spawn_worker();
        command_tx.send(KioskCommand::LoadConfig { path }).unwrap();
        assert!(matches!(next(&mut update_rx).await, KioskUpdate::Error { .. }));

        command_tx
            .send(KioskCommand::GenerateShareCode {
                layout: Layout::four_by_five_from_url("https://img.example/a.png"),
            })
            .unwrap();
        assert!(matches!(
            next(&mut update_rx).await,
            KioskUpdate::ShareCodeReady { .. }
        ));
    }
}
