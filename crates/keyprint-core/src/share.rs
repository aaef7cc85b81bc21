//! Share link and QR code generation
//!
//! Codes are produced behind [`QrEncoder`]; [`QrImageEncoder`] renders a real
//! symbol. When the link does not fit, embedded `data:` images are re-encoded
//! in progressively smaller steps before giving up.

use crate::codec::share_url;
use crate::panel::Layout;
use crate::types::{KeyprintError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

/// Byte capacity of a version 40 QR code at error correction level L
pub const QR_V40_L_BYTES: usize = 2953;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QrError {
    #[error("data too long for a QR code ({len} bytes)")]
    CapacityExceeded { len: usize },
    #[error("{0}")]
    Other(String),
}

/// Turns text into a scannable code
pub trait QrEncoder {
    type Output;

    fn encode(&self, text: &str) -> std::result::Result<Self::Output, QrError>;
}

/// Renders the link as a QR symbol at error correction level L.
///
/// `max_bytes` caps the link length below what the symbol itself allows;
/// links the symbol cannot hold fail the same way.
#[derive(Debug, Clone, Copy)]
pub struct QrImageEncoder {
    pub max_bytes: usize,
    /// Edge of one module in pixels
    pub module_px: u32,
}

impl Default for QrImageEncoder {
    fn default() -> Self {
        Self {
            max_bytes: QR_V40_L_BYTES,
            module_px: 4,
        }
    }
}

impl QrEncoder for QrImageEncoder {
    type Output = GrayImage;

    fn encode(&self, text: &str) -> std::result::Result<GrayImage, QrError> {
        let len = text.len();
        if len > self.max_bytes {
            return Err(QrError::CapacityExceeded { len });
        }
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L).map_err(
            |e| match e {
                qrcode::types::QrError::DataTooLong => QrError::CapacityExceeded { len },
                other => QrError::Other(other.to_string()),
            },
        )?;
        Ok(code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_px, self.module_px)
            .build())
    }
}

/// One recompression step for embedded images
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecompressStep {
    pub max_dimension: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
}

pub const RECOMPRESS_STEPS: [RecompressStep; 3] = [
    RecompressStep {
        max_dimension: 640,
        quality: 70,
    },
    RecompressStep {
        max_dimension: 480,
        quality: 55,
    },
    RecompressStep {
        max_dimension: 320,
        quality: 40,
    },
];

/// A generated code plus the link and layout it encodes
#[derive(Debug, Clone)]
pub struct ShareCode<T> {
    pub url: String,
    pub code: T,
    /// Layout actually encoded (images may have been recompressed)
    pub layout: Layout,
    /// 1 when the first try fitted
    pub attempts: usize,
}

/// Build the share link for `layout` and encode it.
///
/// Capacity failures trigger the recompression steps; any other encoder
/// failure is returned immediately.
pub fn generate_share_code<E: QrEncoder>(
    layout: &Layout,
    origin: &str,
    encoder: &E,
) -> Result<ShareCode<E::Output>> {
    let url = share_url(origin, layout)?;
    let mut last_len = url.len();
    match encoder.encode(&url) {
        Ok(code) => {
            return Ok(ShareCode {
                url,
                code,
                layout: layout.clone(),
                attempts: 1,
            });
        }
        Err(QrError::CapacityExceeded { len }) => {
            log::warn!("Share link too large for QR ({len} bytes), recompressing images");
        }
        Err(QrError::Other(e)) => return Err(KeyprintError::QrEncoder(e)),
    }

    for (i, step) in RECOMPRESS_STEPS.iter().enumerate() {
        let attempts = i + 2;
        let smaller = recompress_layout(layout, *step);
        let url = share_url(origin, &smaller)?;
        last_len = url.len();
        match encoder.encode(&url) {
            Ok(code) => {
                log::info!(
                    "Share code fitted after recompressing to {}px q{}",
                    step.max_dimension,
                    step.quality
                );
                return Ok(ShareCode {
                    url,
                    code,
                    layout: smaller,
                    attempts,
                });
            }
            Err(QrError::CapacityExceeded { len }) => {
                log::warn!(
                    "Still too large at {}px q{} ({len} bytes)",
                    step.max_dimension,
                    step.quality
                );
            }
            Err(QrError::Other(e)) => return Err(KeyprintError::QrEncoder(e)),
        }
    }

    Err(KeyprintError::QrCapacityExhausted {
        attempts: RECOMPRESS_STEPS.len() + 1,
        bytes: last_len,
    })
}

/// Copy of `layout` with every `data:` image recompressed
fn recompress_layout(layout: &Layout, step: RecompressStep) -> Layout {
    let mut smaller = layout.clone();
    for (key, record) in smaller.iter_mut() {
        let Some(image_ref) = record.image_ref.as_deref() else {
            continue;
        };
        if !image_ref.starts_with("data:") {
            continue;
        }
        match recompress_data_uri(image_ref, step) {
            Ok(uri) => record.image_ref = Some(uri),
            Err(e) => log::warn!("Could not recompress image of '{key}': {e}"),
        }
    }
    smaller
}

/// Downscale and re-encode a `data:` image.
///
/// JPEG is tried first, then PNG; the original is kept when neither is
/// smaller.
pub fn recompress_data_uri(uri: &str, step: RecompressStep) -> Result<String> {
    let image = decode_data_uri(uri)?;
    let (w, h) = (image.width(), image.height());
    let scale = (step.max_dimension as f32 / w.max(h) as f32).min(1.0);
    let target_w = ((w as f32 * scale).round() as u32).max(1);
    let target_h = ((h as f32 * scale).round() as u32).max(1);
    let resized = if (target_w, target_h) == (w, h) {
        image
    } else {
        image.resize_exact(target_w, target_h, FilterType::Triangle)
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, step.quality.clamp(1, 100))
        .encode_image(&resized.to_rgb8())?;
    let jpeg_uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg));
    if jpeg_uri.len() < uri.len() {
        return Ok(jpeg_uri);
    }

    let mut png = Cursor::new(Vec::new());
    resized.write_to(&mut png, ImageFormat::Png)?;
    let png_uri = format!("data:image/png;base64,{}", STANDARD.encode(png.get_ref()));
    if png_uri.len() < uri.len() {
        return Ok(png_uri);
    }
    Ok(uri.to_string())
}

/// Decode a base64 `data:` URI into an image
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| KeyprintError::InvalidInput("not a data URI".to_string()))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| KeyprintError::InvalidInput("malformed data URI".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(KeyprintError::InvalidInput(
            "only base64 data URIs are supported".to_string(),
        ));
    }
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| KeyprintError::InvalidInput(format!("bad base64 in data URI: {e}")))?;
    Ok(image::load_from_memory(&bytes)?)
}
