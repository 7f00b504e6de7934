//! Affinity cookie parsing and issuing.

use axum::http::{header, HeaderMap, HeaderValue};

/// Name of the session affinity cookie.
pub const COOKIE_NAME: &str = "proxy_session";

/// Find the affinity cookie value among the request's `Cookie` headers.
pub fn read_affinity_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.trim_matches('"'))
}

/// Build the `Set-Cookie` value binding a client to `token`.
pub fn affinity_cookie(token: &str, max_age_secs: u64) -> Option<HeaderValue> {
    let cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly",
        COOKIE_NAME, token, max_age_secs
    );
    HeaderValue::from_str(&cookie).ok()
}
