//! Response decoding for the two-step stream handshake.
//!
//! Both AJAX replies are `{"data": ...}` envelopes. The first carries a
//! nonce, the second a base64-encoded HTML fragment (or bare URL) naming the
//! player.

use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::Result;
use crate::model::LENIENT_BASE64;

static IFRAME_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"src="([^"]+)""#).expect("valid regex"));

#[derive(Debug, Deserialize)]
struct AjaxEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl AjaxEnvelope {
    fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Non-empty string or numeric `data`, as text.
    fn data(self) -> Option<String> {
        match self.data? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Nonce from the first handshake reply. `Ok(None)` when the site sent none.
pub fn nonce_from(body: &str) -> Result<Option<String>> {
    Ok(AjaxEnvelope::parse(body)?.data())
}

/// Player URL from the second handshake reply.
///
/// The decoded payload is searched for `src="..."`; a payload that is
/// itself a URL is used as-is. Anything else means no player.
pub fn player_url_from(body: &str) -> Result<Option<String>> {
    let Some(data) = AjaxEnvelope::parse(body)?.data() else {
        return Ok(None);
    };

    let payload = String::from_utf8(LENIENT_BASE64.decode(data.trim())?)?;
    Ok(player_url(&payload))
}

fn player_url(payload: &str) -> Option<String> {
    if let Some(caps) = IFRAME_SRC.captures(payload) {
        return Some(caps[1].to_string());
    }
    payload.starts_with("http").then(|| payload.to_string())
}
