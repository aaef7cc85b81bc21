//! Payload codec
//!
//! Layout <-> JSON payload <-> lz-string token <-> share link.

mod payload;
mod scan;
mod token;

pub use payload::*;
pub use scan::{decode_scanned, extract_token};
pub use token::{decode_payload, encode_payload, share_url};
