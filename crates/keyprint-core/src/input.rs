//! Classification of pasted or typed image references

use crate::types::{KeyprintError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use regex::Regex;
use std::sync::LazyLock;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

fn is_http_url(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `http(s)://` URL or `data:` URI
pub fn is_image_reference(s: &str) -> bool {
    is_http_url(s) || s.starts_with("data:")
}

/// Resolve clipboard contents to an image reference.
///
/// Accepts a bare URL or data URI, or HTML containing an `<img src>` or an
/// `<a href>` pointing at one. Anything else is an input error.
pub fn classify_paste(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(KeyprintError::InvalidInput(
            "Clipboard is empty".to_string(),
        ));
    }
    if is_image_reference(text) && !text.contains(char::is_whitespace) {
        return Ok(text.to_string());
    }

    if let Some(src) = IMG_SRC
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|s| is_image_reference(s))
    {
        return Ok(src.to_string());
    }
    if let Some(href) = ANCHOR_HREF
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|s| is_http_url(s))
    {
        return Ok(href.to_string());
    }

    Err(KeyprintError::InvalidInput(
        "Paste an image link (http/https) or an image".to_string(),
    ))
}

/// Embed a picked image file as a `data:` URI.
///
/// The format is sniffed from the bytes; only formats the rasterizer can
/// decode are accepted.
pub fn image_file_data_uri(bytes: &[u8]) -> Result<String> {
    let mime = match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        _ => {
            return Err(KeyprintError::InvalidInput(
                "Choose a PNG or JPEG image".to_string(),
            ));
        }
    };
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}
