//! Compressed, URL-safe payload tokens
//!
//! Tokens are lz-string's URI-component encoding of the JSON payload, the
//! format printed on every kiosk code so far.

use super::payload::Payload;
use crate::panel::Layout;
use crate::types::{KeyprintError, Result};

/// JSON, lz-string compressed into URI-safe characters
pub fn encode_payload(payload: &Payload) -> Result<String> {
    let json = serde_json::to_string(payload)?;
    Ok(lz_str::compress_to_encoded_uri_component(json.as_str()))
}

/// Inverse of [`encode_payload`]
pub fn decode_payload(token: &str) -> Result<Payload> {
    // Query decoding turns the alphabet's '+' into a space
    let token = token.trim().replace(' ', "+");
    if token.is_empty() {
        return Err(KeyprintError::InvalidToken("empty token".to_string()));
    }

    let wide = lz_str::decompress_from_encoded_uri_component(token.as_str())
        .ok_or_else(|| KeyprintError::InvalidToken("corrupt data".to_string()))?;
    let json = String::from_utf16(&wide)
        .map_err(|e| KeyprintError::InvalidToken(format!("corrupt text: {e}")))?;
    if json.is_empty() {
        return Err(KeyprintError::InvalidToken("no data".to_string()));
    }

    serde_json::from_str(&json)
        .map_err(|e| KeyprintError::InvalidPayload(format!("unrecognised payload: {e}")))
}

/// Full share link for a layout: `<origin><edit-path>?data=<token>`
pub fn share_url(origin: &str, layout: &Layout) -> Result<String> {
    let token = encode_payload(&Payload::from_layout(layout))?;
    Ok(format!(
        "{}{}?data={}",
        origin.trim_end_matches('/'),
        layout.template().edit_path(),
        token
    ))
}
