use keyprint_core::*;
use std::time::Duration;

#[test]
fn test_default_options_are_valid() {
    let options = KioskOptions::default();
    assert!(options.validate().is_ok());
    assert_eq!(options.dpi, 300);
    assert_eq!(options.image_timeout(), Duration::from_secs(15));
    assert_eq!(options.jpeg_quality, 92);
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut options = KioskOptions {
        dpi: 10,
        ..Default::default()
    };
    assert!(matches!(options.validate(), Err(KeyprintError::Config(_))));

    options.dpi = 300;
    options.app_origin = "ftp://kiosk.example".to_string();
    assert!(options.validate().is_err());

    options.app_origin = "https://kiosk.example".to_string();
    options.image_timeout_secs = 0;
    assert!(options.validate().is_err());

    options.image_timeout_secs = 5;
    options.calibration = PrintCalibration {
        scale_x: 2.0,
        scale_y: 1.0,
    };
    assert!(options.validate().is_err());
}

#[test]
fn test_proxy_url_resolves_against_origin() {
    let mut options = KioskOptions {
        app_origin: "https://kiosk.example/app/".to_string(),
        ..Default::default()
    };
    assert_eq!(
        options.proxy_url().unwrap().unwrap().as_str(),
        "https://kiosk.example/api/proxy"
    );
    options.proxy_endpoint = Some("https://proxy.example/fetch".to_string());
    assert_eq!(
        options.proxy_url().unwrap().unwrap().as_str(),
        "https://proxy.example/fetch"
    );
    options.proxy_endpoint = None;
    assert!(options.proxy_url().unwrap().is_none());
}

#[test]
fn test_qr_encoder_uses_configured_limit() {
    let options = KioskOptions {
        qr_capacity_bytes: 1200,
        ..Default::default()
    };
    assert_eq!(options.qr_encoder().max_bytes, 1200);
    assert_eq!(KioskOptions::default().qr_encoder().max_bytes, share::QR_V40_L_BYTES);
}

#[test]
fn test_calibration_only_when_enabled() {
    let mut options = KioskOptions::default();
    assert_eq!(options.raster_options().calibration, PrintCalibration::IDENTITY);
    options.apply_print_calibration = true;
    assert_eq!(options.raster_options().calibration.scale_x, 0.95);
}

#[tokio::test]
async fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kiosk.json");

    let options = KioskOptions {
        dpi: 600,
        export_format: RasterFormat::Jpeg,
        apply_print_calibration: true,
        ..Default::default()
    };
    options.save(&path).await.unwrap();
    let loaded = KioskOptions::load(&path).await.unwrap();
    assert_eq!(loaded, options);
}

#[tokio::test]
async fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kiosk.json");
    tokio::fs::write(&path, r#"{ "dpi": 150, "export_format": "jpeg" }"#)
        .await
        .unwrap();
    let loaded = KioskOptions::load(&path).await.unwrap();
    assert_eq!(loaded.dpi, 150);
    assert_eq!(loaded.export_format, RasterFormat::Jpeg);
    assert_eq!(loaded.app_origin, KioskOptions::default().app_origin);
}

#[tokio::test]
async fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kiosk.json");
    tokio::fs::write(&path, r#"{ "dpi": 5 }"#).await.unwrap();
    assert!(KioskOptions::load(&path).await.is_err());
}
