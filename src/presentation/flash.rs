//! One-shot error hand-off across the create -> new redirect.
//!
//! The error collection is stored as base64url(JSON) in a cookie and
//! removed by the first request that reads it.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use tracing::debug;

use crate::domain::error::ValidationErrors;

pub const FLASH_COOKIE: &str = "flash";

/// Store `errors` for the next request
pub fn set_errors(jar: CookieJar, errors: &ValidationErrors) -> CookieJar {
    let value = match serde_json::to_vec(errors) {
        Ok(json) => URL_SAFE_NO_PAD.encode(json),
        Err(e) => {
            debug!(error = %e, "could not encode flash");
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true),
    )
}

/// Read and clear the flashed errors. A missing or unreadable cookie yields no errors.
pub fn take_errors(jar: CookieJar) -> (CookieJar, ValidationErrors) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, ValidationErrors::new());
    };

    let errors = URL_SAFE_NO_PAD
        .decode(cookie.value())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_else(|| {
            debug!("discarding unreadable flash cookie");
            ValidationErrors::new()
        });

    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), errors)
}
