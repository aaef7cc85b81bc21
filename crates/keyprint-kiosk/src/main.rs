#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Context;
use eframe::egui;
use std::path::PathBuf;

mod app;
mod canvas;
mod handlers;
mod logger;
mod views;
mod worker;

fn main() -> anyhow::Result<()> {
    let logger = logger::AppLogger::new(500);
    logger.clone().init().context("Failed to install logger")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let tokio_handle = runtime.handle().clone();

    // Optional kiosk configuration file
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_title("Keyprint"),
        ..Default::default()
    };

    eframe::run_native(
        "Keyprint",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::KioskApp::new(
                cc,
                tokio_handle,
                logger,
                config_path,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    drop(runtime);
    Ok(())
}
