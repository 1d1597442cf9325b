//! One-shot messages carried across a redirect in a cookie.

use axum::http::{header, HeaderMap};

const COOKIE_NAME: &str = "flash";

pub fn set_cookie(message: &str) -> String {
    let encoded = base64::encode_config(message, base64::URL_SAFE_NO_PAD);
    format!("{COOKIE_NAME}={encoded}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Returns the pending message, if the request carries one.
pub fn take(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
        .and_then(|(_, value)| base64::decode_config(value, base64::URL_SAFE_NO_PAD).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
}
