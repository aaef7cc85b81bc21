//! Token extraction from scanned or pasted text
//!
//! Order of attempts:
//! 1. Absolute URL: `data` query parameter, then `data` inside the fragment
//! 2. Any `data=` occurrence in the raw text
//! 3. The whole trimmed text

use super::payload::Payload;
use super::token::decode_payload;
use crate::types::{KeyprintError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use url::form_urlencoded;

static DATA_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[?&#/\s])data=([^&#\s]+)").expect("valid regex"));

fn data_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "data")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn from_url(text: &str) -> Option<String> {
    let url = Url::parse(text).ok()?;
    if url.cannot_be_a_base() {
        return None;
    }
    if let Some(v) = url.query().and_then(data_param) {
        return Some(v);
    }
    // Hash routing: "#/p/4x5/edit?data=..." or "#data=..."
    let fragment = url.fragment()?;
    let params = fragment.split_once('?').map_or(fragment, |(_, q)| q);
    data_param(params.trim_start_matches(['/', '#']))
}

fn from_raw(text: &str) -> Option<String> {
    let captured = DATA_PARAM.captures(text)?.get(1)?.as_str();
    data_param(&format!("data={captured}"))
}

/// Pull the payload token out of whatever a scanner produced
pub fn extract_token(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    from_url(text)
        .or_else(|| from_raw(text))
        .or_else(|| Some(text.to_string()))
}

/// Extract and decode in one step
pub fn decode_scanned(text: &str) -> Result<Payload> {
    let token = extract_token(text)
        .ok_or_else(|| KeyprintError::InvalidToken("nothing was scanned".to_string()))?;
    decode_payload(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_wins_over_fragment() {
        let t = extract_token("https://k.example/p/4x5/edit?data=AAA#data=BBB").unwrap();
        assert_eq!(t, "AAA");
    }

    #[test]
    fn hash_routed_link() {
        let t = extract_token("https://k.example/#/p/cd/edit?data=abc-_1").unwrap();
        assert_eq!(t, "abc-_1");
    }

    #[test]
    fn raw_text_with_parameter() {
        let t = extract_token("scan: /p/4x5/edit?data=xyz&x=1").unwrap();
        assert_eq!(t, "xyz");
    }

    #[test]
    fn other_parameters_ending_in_data_are_ignored() {
        let t = extract_token("scan: /p/4x5/edit?metadata=nope&data=yes").unwrap();
        assert_eq!(t, "yes");
        // no real parameter, so the whole text is the token
        assert_eq!(extract_token("metadata=nope").unwrap(), "metadata=nope");
    }

    #[test]
    fn bare_token() {
        assert_eq!(extract_token("  tok123 \n").unwrap(), "tok123");
        assert!(extract_token("   ").is_none());
    }
}
